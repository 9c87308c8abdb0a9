//! The declaration and type model that symbols are produced from. It only
//! carries the identity of entities and the properties of them that affect
//! how they are mangled.

pub mod conformance;
pub mod ctx;
pub mod decl;
pub mod generics;
pub mod identifier;
pub mod ty;

pub use ctx::TyCtx;
pub use identifier::Identifier;
