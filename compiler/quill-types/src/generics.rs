//! Generic signatures and their requirements.

use thin_vec::ThinVec;

use crate::{
    decl::NominalId,
    ty::{GenericParamTy, Ty},
};

/// A constraint placed upon a generic parameter, or one of its associated
/// types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// `subject: Protocol`
    Conformance { subject: Ty, protocol: NominalId },

    /// `subject: SuperClass`
    Superclass { subject: Ty, bound: Ty },

    /// `subject == ty`
    SameType { subject: Ty, ty: Ty },

    /// `subject: AnyObject`
    Layout { subject: Ty },
}

impl Requirement {
    /// The type being constrained by the requirement.
    pub fn subject(&self) -> &Ty {
        match self {
            Requirement::Conformance { subject, .. }
            | Requirement::Superclass { subject, .. }
            | Requirement::SameType { subject, .. }
            | Requirement::Layout { subject } => subject,
        }
    }
}

/// The generic parameters of some generic context, and the requirements on
/// them. Parameters are sorted by depth and then by index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GenericSignature {
    pub params: ThinVec<GenericParamTy>,
    pub requirements: ThinVec<Requirement>,
}

impl GenericSignature {
    pub fn new(
        params: impl IntoIterator<Item = GenericParamTy>,
        requirements: impl IntoIterator<Item = Requirement>,
    ) -> Self {
        let mut params: ThinVec<_> = params.into_iter().collect();
        params.sort();
        Self { params, requirements: requirements.into_iter().collect() }
    }

    /// The deepest generic parameter depth of the signature.
    pub fn max_depth(&self) -> Option<u32> {
        self.params.iter().map(|param| param.depth).max()
    }

    /// The parameters which are introduced by this signature on top of the
    /// `context` signature.
    pub fn params_relative_to<'a>(
        &'a self,
        context: Option<&GenericSignature>,
    ) -> impl Iterator<Item = GenericParamTy> + 'a {
        let base = context.and_then(GenericSignature::max_depth);
        self.params.iter().copied().filter(move |param| base.is_none_or(|base| param.depth > base))
    }

    /// The requirements which this signature adds on top of the `context`
    /// signature.
    pub fn requirements_relative_to<'a>(
        &'a self,
        context: Option<&'a GenericSignature>,
    ) -> impl Iterator<Item = &'a Requirement> + 'a {
        self.requirements
            .iter()
            .filter(move |req| context.is_none_or(|context| !context.requirements.contains(req)))
    }
}
