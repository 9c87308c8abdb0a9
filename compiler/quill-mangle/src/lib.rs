//! The base mangling primitives. A [Mangler] builds up a symbol from
//! types, declarations, conformances and generic signatures, compressing
//! repeated sub-expressions through a substitution table.
//!
//! The [Mangler] is agnostic of what kind of symbol is being produced, and
//! of *which* references should be emitted as symbolic references. Both are
//! decided by the code generator through the [ManglingPolicy] that is active
//! while mangling.

pub mod mangler;
pub mod policy;
pub mod standard;
pub mod substitution;

pub use mangler::Mangler;
pub use policy::{ManglingPolicy, SymbolicReferenceFn, SymbolicReferent};

/// The prefix that every (non debug) symbol starts with.
pub const MANGLING_PREFIX: &str = "$s";

/// The control byte that starts a direct symbolic reference.
pub const SYMBOLIC_REFERENCE_DIRECT: u8 = 0x01;

/// The number of bytes a symbolic reference placeholder occupies in the
/// buffer: the control byte followed by four bytes that are later filled
/// with a relative relocation.
pub const SYMBOLIC_REFERENCE_SIZE: usize = 5;
