//! The policy that is active while mangling. The policy is scoped state, it
//! is installed for the duration of a mangling operation and restored when the
//! operation finishes, see [crate::Mangler::with_policy].

use quill_types::{
    TyCtx,
    decl::{NominalId, OpaqueId},
};

/// An entity that may be referenced symbolically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From)]
pub enum SymbolicReferent {
    Nominal(NominalId),
    Opaque(OpaqueId),
}

/// Decides whether a particular referent may be emitted as a symbolic
/// reference under the given policy.
pub type SymbolicReferenceFn = fn(&TyCtx, &ManglingPolicy, SymbolicReferent) -> bool;

/// Flags that control which (optional) encodings the mangler may use.
#[derive(Debug, Clone, Copy)]
pub struct ManglingPolicy {
    /// Whether symbolic references may be emitted at all.
    pub allow_symbolic_references: bool,

    /// Decides which referents become symbolic references, only consulted
    /// when `allow_symbolic_references` is set.
    pub can_symbolic_reference: Option<SymbolicReferenceFn>,

    /// Whether the compact manglings of well-known types may be used.
    pub allow_standard_substitutions: bool,

    /// Whether the compact manglings of well-known concurrency types may be
    /// used. Only has an effect if `allow_standard_substitutions` is set.
    pub allow_concurrency_standard_substitutions: bool,

    /// Whether marker protocols are spelled out in compositions and generic
    /// requirements.
    pub allow_marker_protocols: bool,
}

impl ManglingPolicy {
    /// Whether the given referent should be emitted as a symbolic reference.
    pub fn should_symbolic_reference(&self, tcx: &TyCtx, referent: SymbolicReferent) -> bool {
        self.allow_symbolic_references
            && self.can_symbolic_reference.is_some_and(|can_reference| can_reference(tcx, self, referent))
    }
}

impl Default for ManglingPolicy {
    fn default() -> Self {
        Self {
            allow_symbolic_references: false,
            can_symbolic_reference: None,
            allow_standard_substitutions: true,
            allow_concurrency_standard_substitutions: true,
            allow_marker_protocols: true,
        }
    }
}
