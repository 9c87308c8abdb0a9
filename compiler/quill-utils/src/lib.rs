//! Quill compiler general utilities

pub mod logging;
pub mod state;
pub mod stream;

// Re-export commonly used collection packages
pub use fxhash;
pub use index_vec;
pub use itertools;
// Re-export logging utility
pub use log;
pub use smallvec;
pub use thin_vec;
