//! Infrastructure layer: filesystem access and text decoding
//!
//! This layer implements the I/O boundary used by coercion.

pub mod decode;
pub mod traits;

pub use decode::Format;
pub use traits::{FileSystem, RealFileSystem};
