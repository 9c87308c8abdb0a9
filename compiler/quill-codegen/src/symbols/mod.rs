//! Common utilities to aid code generation backends when creating symbol
//! names for items that are generated/emitted by the compiler.
//!
//! Every kind of symbol has an entry point on the
//! [mangle::SymbolMangler]. The other modules provide the policies that the
//! entry points run the base mangler under:
//!
//! - [symbolic] decides which entities may be replaced by a symbolic
//!   reference, i.e. a placeholder that is later relocated to point at the
//!   entity's descriptor.
//!
//! - [policy] restricts the compact standard substitutions to what the
//!   runtime of the target understands.
//!
//! - [shape] produces the keys that extended existential type shapes are
//!   uniqued by.
//!
//! - [debug] produces the readable strings that runtime accessors and
//!   debuggers refer to entities by.

pub mod debug;
pub mod mangle;
pub mod policy;
pub mod shape;
pub mod symbolic;
pub mod witness;

use quill_mangle::{SYMBOLIC_REFERENCE_SIZE, SymbolicReferent};

/// The result of mangling under symbolic references: the mangled string,
/// which contains a placeholder for each symbolic reference, and the
/// referents alongside the offsets of their placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicMangling {
    pub string: String,
    pub symbolic_references: Vec<(SymbolicReferent, usize)>,
}

impl SymbolicMangling {
    /// Get the byte range of every placeholder within the string.
    pub fn placeholders(&self) -> impl Iterator<Item = (SymbolicReferent, std::ops::Range<usize>)> + '_ {
        self.symbolic_references
            .iter()
            .map(|&(referent, offset)| (referent, offset..offset + SYMBOLIC_REFERENCE_SIZE))
    }
}

/// What a mangled type reference is used for. This decides the prefix of
/// the debug name of the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MangledTypeRefRole {
    /// The reference is used to instantiate type metadata.
    Metadata,

    /// The reference is only read by reflection.
    Reflection,

    /// The reference is the default witness of an associated type.
    DefaultAssociatedTypeWitness,
}

impl MangledTypeRefRole {
    /// The prefix of the debug string of a type reference with this role.
    pub fn debug_prefix(&self) -> &'static str {
        match self {
            MangledTypeRefRole::Metadata | MangledTypeRefRole::Reflection => "symbolic ",
            MangledTypeRefRole::DefaultAssociatedTypeWitness => "default assoc type ",
        }
    }
}
