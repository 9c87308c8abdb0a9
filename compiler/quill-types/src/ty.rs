//! The structural type representation that symbols are produced from.

use thin_vec::{ThinVec, thin_vec};

use crate::{
    decl::{NominalId, OpaqueId},
    identifier::Identifier,
};

/// A type. Types are plain values, two types are the same type iff they
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    /// A reference to a nominal type, possibly with generic arguments.
    Nominal(NominalTy),

    /// A generic parameter `τ_depth_index`.
    GenericParam(GenericParamTy),

    /// An associated type of some base type, e.g. `T.Element`.
    DependentMember { base: Box<Ty>, name: Identifier },

    /// The type of a type, i.e. `T.Type`.
    Metatype(Box<Ty>),

    /// A type-erased container of any value satisfying the constraints.
    Existential(ExistentialTy),

    /// A tuple of types.
    Tuple(ThinVec<Ty>),

    /// The underlying type of an opaque result type declaration.
    Opaque(OpaqueTy),
}

impl Ty {
    /// A nominal type without any generic arguments.
    pub fn nominal(decl: NominalId) -> Self {
        Self::Nominal(NominalTy { decl, args: ThinVec::new() })
    }

    /// A nominal type applied to generic arguments.
    pub fn bound(decl: NominalId, args: impl IntoIterator<Item = Ty>) -> Self {
        Self::Nominal(NominalTy { decl, args: args.into_iter().collect() })
    }

    pub fn param(depth: u32, index: u32) -> Self {
        Self::GenericParam(GenericParamTy { depth, index })
    }

    pub fn member(base: Ty, name: impl Into<Identifier>) -> Self {
        Self::DependentMember { base: Box::new(base), name: name.into() }
    }

    pub fn metatype(instance: Ty) -> Self {
        Self::Metatype(Box::new(instance))
    }

    /// Wrap the type in `depth` layers of metatypes.
    pub fn metatype_of_depth(self, depth: u32) -> Self {
        (0..depth).fold(self, |ty, _| Self::metatype(ty))
    }

    /// The existential `any P`.
    pub fn protocol_existential(protocol: NominalId) -> Self {
        Self::Existential(ExistentialTy::protocol(protocol))
    }

    /// The empty tuple.
    pub fn unit() -> Self {
        Self::Tuple(ThinVec::new())
    }

    /// Whether any generic parameter occurs within the type.
    pub fn has_generic_params(&self) -> bool {
        match self {
            Ty::GenericParam(_) | Ty::DependentMember { .. } => true,
            Ty::Nominal(NominalTy { args, .. }) | Ty::Opaque(OpaqueTy { args, .. }) => {
                args.iter().any(Ty::has_generic_params)
            }
            Ty::Metatype(instance) => instance.has_generic_params(),
            Ty::Existential(existential) => {
                existential.superclass.as_deref().is_some_and(Ty::has_generic_params)
            }
            Ty::Tuple(elements) => elements.iter().any(Ty::has_generic_params),
        }
    }
}

/// A nominal type applied to (possibly zero) generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NominalTy {
    pub decl: NominalId,
    pub args: ThinVec<Ty>,
}

/// A generic parameter, identified by its depth (how many generic contexts
/// it is nested in) and its index within that depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Constructor)]
pub struct GenericParamTy {
    pub depth: u32,
    pub index: u32,
}

/// A reference to the underlying type of an opaque declaration. A single
/// declaration can hide several types, `ordinal` picks which one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueTy {
    pub decl: OpaqueId,
    pub ordinal: u32,
    pub args: ThinVec<Ty>,
}

/// A protocol composition used as a type-erased container: any value that
/// conforms to all `protocols`, is a subclass of `superclass`, and (when
/// `any_object` is set) is a class instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExistentialTy {
    pub protocols: ThinVec<NominalId>,
    pub superclass: Option<Box<Ty>>,
    pub any_object: bool,
}

impl ExistentialTy {
    /// The existential `Any`, which has no constraints.
    pub fn any() -> Self {
        Self::default()
    }

    /// The existential `AnyObject`.
    pub fn any_object() -> Self {
        Self { any_object: true, ..Self::default() }
    }

    /// The existential of a single protocol.
    pub fn protocol(protocol: NominalId) -> Self {
        Self { protocols: thin_vec![protocol], ..Self::default() }
    }

    /// A composition of several protocols.
    pub fn composition(protocols: impl IntoIterator<Item = NominalId>) -> Self {
        Self { protocols: protocols.into_iter().collect(), ..Self::default() }
    }

    pub fn with_superclass(mut self, superclass: Ty) -> Self {
        self.superclass = Some(Box::new(superclass));
        self
    }

    pub fn is_any(&self) -> bool {
        self.protocols.is_empty() && self.superclass.is_none() && !self.any_object
    }

    pub fn is_any_object(&self) -> bool {
        self.protocols.is_empty() && self.superclass.is_none() && self.any_object
    }

    /// If the existential is a plain `any P`, get `P`.
    pub fn as_single_protocol(&self) -> Option<NominalId> {
        match self.protocols.as_slice() {
            [protocol] if self.superclass.is_none() && !self.any_object => Some(*protocol),
            _ => None,
        }
    }
}
