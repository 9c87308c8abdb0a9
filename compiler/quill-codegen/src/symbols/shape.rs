//! Extended existential type shapes.
//!
//! The shape of an existential is everything about it that is independent
//! of the concrete types it is used with: its requirement signature, the
//! generalization signature that abstracts over the types, the number of
//! metatype layers around it, and how its values are stored. Existentials
//! with the same shape share runtime metadata, so the mangled shape is used
//! both as the symbol of the shape descriptor and as the key that shapes are
//! uniqued by.

use quill_types::{
    generics::GenericSignature,
    ty::{ExistentialTy, Ty},
};
use quill_utils::itertools::Itertools;

use super::mangle::SymbolMangler;

impl SymbolMangler<'_> {
    /// The symbol of the shape descriptor of `existential`, wrapped in
    /// `metatype_depth` metatypes. Shapes that aren't unique get a suffix so
    /// that they aren't mistaken for the uniqued descriptor.
    pub fn mangle_extended_existential_type_shape(
        &mut self,
        is_unique: bool,
        generalization: Option<&GenericSignature>,
        existential: &ExistentialTy,
        metatype_depth: u32,
    ) -> String {
        self.mangler.begin_mangling();
        self.append_extended_existential_type_shape(generalization, existential, metatype_depth);

        if !is_unique {
            self.mangler.append_operator("Mq");
        }

        self.finish()
    }

    /// The key that the shape of `existential` is uniqued by. This isn't a
    /// symbol, and so it doesn't have the mangling prefix.
    pub fn mangle_extended_existential_type_shape_for_uniquing(
        &mut self,
        generalization: Option<&GenericSignature>,
        existential: &ExistentialTy,
        metatype_depth: u32,
    ) -> String {
        self.mangler.begin_mangling_without_prefix();
        self.append_extended_existential_type_shape(generalization, existential, metatype_depth);
        self.finish()
    }

    fn append_extended_existential_type_shape(
        &mut self,
        generalization: Option<&GenericSignature>,
        existential: &ExistentialTy,
        metatype_depth: u32,
    ) {
        let tcx = self.tcx();
        let requirements = tcx.opened_existential_signature(existential, generalization);

        self.mangler.append_generic_signature(&requirements, generalization);

        if let Some(generalization) = generalization {
            self.mangler.append_generic_signature(generalization, None);
        }

        // Metatypes are the only type expression a shape can have.
        if metatype_depth > 0 {
            let ty = shape_type_expression(&requirements, generalization, metatype_depth);
            self.mangler.append_type(&ty, Some(&requirements));
        }

        self.mangler.append_operator(match (generalization.is_some(), metatype_depth > 0) {
            (false, false) => "Xg",
            (false, true) => "Xh",
            (true, false) => "XG",
            (true, true) => "XH",
        });

        if metatype_depth > 0 {
            self.mangler.append_operator("m");
        } else if tcx.requires_class(existential) {
            self.mangler.append_operator("c");
        } else {
            self.mangler.append_operator("o");
        }
    }
}

/// The type expression of a shape: the parameter that the requirement
/// signature introduces, wrapped in `metatype_depth` metatypes.
///
/// Panics if the requirement signature doesn't introduce exactly one generic
/// parameter on top of the generalization signature.
fn shape_type_expression(
    requirements: &GenericSignature,
    generalization: Option<&GenericSignature>,
    metatype_depth: u32,
) -> Ty {
    let params = requirements.params_relative_to(generalization).collect_vec();

    let [param] = params.as_slice() else {
        panic!(
            "requirement signature of an existential metatype must have exactly one generic parameter, found {}",
            params.len()
        );
    };

    Ty::GenericParam(*param).metatype_of_depth(metatype_depth)
}
