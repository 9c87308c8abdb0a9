//! Quill compiler code generation crate. This crate contains the parts of code
//! generation that are independent of any particular backend. At the moment
//! this is the production of symbol names for everything that the backend
//! emits: value witnesses, conformance descriptors, reflection type
//! references, extended existential shapes and the various debug strings
//! that the runtime accessor thunks are keyed by.
//!
//! All symbols are produced through a [symbols::mangle::SymbolMangler], which
//! is configured by the [settings::CodeGenSettings] of the compilation.

pub mod settings;
pub mod symbols;

// re-export the `target` crate so that users of the settings don't need to
// depend on it directly.
pub use quill_target as target;
