//! Protocol conformances.

use crate::{
    decl::{ModuleId, NominalId},
    ty::Ty,
};

/// A conformance declared in source: `ty` conforms to `protocol`, and the
/// conformance was declared in `module`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalConformance {
    pub ty: Ty,
    pub protocol: NominalId,
    pub module: ModuleId,
}

/// A conformance that isn't derived from another one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootConformance {
    Normal(NormalConformance),

    /// The conformance of the existential `any P` to `P` itself.
    SelfConformance(NominalId),
}

/// A reference to a conformance, which is either known, or only known to
/// exist because a generic requirement says so.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConformanceRef {
    Abstract(NominalId),
    Concrete(RootConformance),
}
