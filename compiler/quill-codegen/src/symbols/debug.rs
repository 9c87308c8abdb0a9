//! Debug strings. These aren't symbols, they are the readable names that the
//! runtime accessor thunks and reflection records are keyed by, so that tools
//! which can't resolve relocations can still tell what an entity refers to.
//!
//! Every debug string starts with a prefix that describes what it names,
//! followed by the mangling of the named entity.

use quill_mangle::SymbolicReferent;
use quill_types::{
    conformance::{ConformanceRef, NormalConformance},
    decl::{NominalId, OpaqueId},
    generics::{GenericSignature, Requirement},
    ty::Ty,
};
use quill_utils::log;

use super::{MangledTypeRefRole, SymbolicMangling, mangle::SymbolMangler};

impl SymbolMangler<'_> {
    /// The debug string of a type reference that was mangled with symbolic
    /// references. The placeholders of the references are blanked out, and
    /// the referenced entities are appended in the order that they occur.
    ///
    /// Panics if a recorded reference doesn't point at a placeholder of the
    /// mangling.
    pub fn mangle_symbol_name_for_symbolic_mangling(
        &mut self,
        mangling: &SymbolicMangling,
        role: MangledTypeRefRole,
    ) -> String {
        let prefix = role.debug_prefix();

        self.mangler.begin_mangling_without_prefix();
        self.mangler.push(prefix);
        self.mangler.push(&mangling.string);

        for &(referent, offset) in &mangling.symbolic_references {
            self.mangler.erase_symbolic_reference(prefix.len() + offset, '_');
            self.mangler.push(" ");

            match referent {
                SymbolicReferent::Nominal(nominal) => {
                    let alternate_module = self.tcx().nominal(nominal).alternate_module_name;
                    self.mangler.append_nominal_context(nominal, alternate_module);
                }
                SymbolicReferent::Opaque(opaque) => self.mangler.append_opaque_decl_name(opaque),
            }
        }

        log::trace!("patched {} symbolic references", mangling.symbolic_references.len());
        self.finish()
    }

    /// The debug string of the accessor of an associated conformance. The
    /// conformance is absent for default associated conformances, which are
    /// declared by the protocol itself.
    pub fn mangle_symbol_name_for_associated_conformance_witness(
        &mut self,
        conformance: Option<&NormalConformance>,
        associated_type: &Ty,
        protocol: NominalId,
    ) -> String {
        self.mangler.begin_mangling_without_prefix();

        match conformance {
            Some(conformance) => {
                self.mangler.push("associated conformance ");
                self.mangler.append_normal_conformance(conformance);
            }
            None => self.mangler.push("default associated conformance"),
        }

        let mut is_first = true;
        self.mangler.append_associated_type_path(associated_type, &mut is_first);
        self.mangler.append_protocol_name(protocol, true);
        self.finish()
    }

    /// The debug string of a metadata accessor that is keyed by a mangled
    /// string. `kind` describes the accessor.
    pub fn mangle_symbol_name_for_mangled_metadata_accessor_string(
        &mut self,
        kind: &str,
        signature: Option<&GenericSignature>,
        ty: Option<&Ty>,
    ) -> String {
        self.begin_debug_string(kind);

        if let Some(signature) = signature {
            self.mangler.append_generic_signature(signature, None);
        }

        if let Some(ty) = ty {
            self.mangler.append_type(ty, signature);
        }

        self.finish()
    }

    /// The debug string of a witness table accessor that is keyed by a
    /// mangled string. `kind` describes the accessor.
    pub fn mangle_symbol_name_for_mangled_conformance_accessor_string(
        &mut self,
        kind: &str,
        signature: Option<&GenericSignature>,
        ty: &Ty,
        conformance: &ConformanceRef,
    ) -> String {
        self.begin_debug_string(kind);

        if let Some(signature) = signature {
            self.mangler.append_generic_signature(signature, None);
        }

        self.mangler.append_any_protocol_conformance(signature, ty, conformance);
        self.finish()
    }

    /// The debug string of the accessor of the underlying type of an opaque
    /// type. A declaration can have several opaque types, `index` picks which
    /// one.
    pub fn mangle_symbol_name_for_underlying_type_accessor_string(
        &mut self,
        opaque: OpaqueId,
        index: u32,
    ) -> String {
        self.begin_debug_string("get_underlying_type_ref");
        self.append_opaque_decl_with_context(opaque);

        if index == 0 {
            self.mangler.append_operator("Qr");
        } else {
            self.mangler.append_operator_with_index("QR", index.into());
        }

        self.finish()
    }

    /// The debug string of the accessor of the witness table that the
    /// underlying type of an opaque type satisfies the requirement with.
    pub fn mangle_symbol_name_for_underlying_witness_table_accessor_string(
        &mut self,
        opaque: OpaqueId,
        requirement: &Requirement,
        protocol: NominalId,
    ) -> String {
        let signature = self.tcx().opaque(opaque).generic_signature.as_ref();

        self.begin_debug_string("get_underlying_witness");
        self.append_opaque_decl_with_context(opaque);
        self.mangler.append_type(requirement.subject(), signature);
        self.mangler.append_protocol_name(protocol, true);
        self.mangler.append_operator("HC");
        self.finish()
    }

    /// The debug string of the generic environment of a signature.
    pub fn mangle_symbol_name_for_generic_environment(&mut self, signature: &GenericSignature) -> String {
        self.begin_debug_string("generic environment");
        self.mangler.append_generic_signature(signature, None);
        self.finish()
    }

    fn begin_debug_string(&mut self, kind: &str) {
        self.mangler.begin_mangling_without_prefix();
        self.mangler.push(kind);
        self.mangler.push(" ");
    }

    fn append_opaque_decl_with_context(&mut self, opaque: OpaqueId) {
        self.mangler.append_context_of(opaque.into());
        self.mangler.append_opaque_decl_name(opaque);
    }
}
