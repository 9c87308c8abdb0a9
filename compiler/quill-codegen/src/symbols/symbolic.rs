//! Deciding which entities are mangled as symbolic references.

use quill_mangle::{Mangler, ManglingPolicy, SymbolicReferent, standard::standard_substitution_for};
use quill_types::{
    TyCtx,
    decl::{ForeignClassKind, NominalKind},
};
use quill_utils::log;

use super::SymbolicMangling;

/// Whether `referent` may be mangled as a symbolic reference under `policy`.
///
/// A symbolic reference has to be resolvable by the runtime, so only entities
/// that are guaranteed to have a context descriptor qualify. Types that have
/// a standard substitution don't qualify either, their substitution is
/// shorter than the placeholder.
pub fn can_symbolic_reference(tcx: &TyCtx, policy: &ManglingPolicy, referent: SymbolicReferent) -> bool {
    let nominal = match referent {
        SymbolicReferent::Nominal(nominal) => nominal,
        SymbolicReferent::Opaque(_) => return true,
    };

    if standard_substitution_for(tcx, policy, nominal).is_some() {
        return false;
    }

    let decl = tcx.nominal(nominal);
    let eligible = match decl.kind {
        NominalKind::Protocol { .. } => !decl.is_objc_protocol(),
        NominalKind::Class { foreign_kind, .. } => {
            decl.has_native_metadata()
                || foreign_kind == ForeignClassKind::CfType
                || decl.is_foreign_reference_type()
        }
        NominalKind::Struct | NominalKind::Enum => true,
    };

    if !eligible {
        log::trace!("`{}` has no descriptor to reference", tcx.qualified_name(nominal));
    }

    eligible
}

/// Run `body` as a fresh mangling session (without the mangling prefix) in
/// which symbolic references are emitted wherever [can_symbolic_reference]
/// allows. The previous policy of the mangler is restored afterwards.
pub fn with_symbolic_references(
    mangler: &mut Mangler<'_>,
    body: impl FnOnce(&mut Mangler<'_>),
) -> SymbolicMangling {
    mangler.with_policy(
        |policy| ManglingPolicy {
            allow_symbolic_references: true,
            can_symbolic_reference: Some(can_symbolic_reference),
            ..policy
        },
        |mangler| {
            mangler.begin_mangling_without_prefix();
            body(mangler);

            let symbolic_references = mangler.take_symbolic_references();
            SymbolicMangling { string: mangler.finalize(), symbolic_references }
        },
    )
}
