//! Application layer: coercion of raw input and tree construction
//!
//! This layer turns files and text into mappings for the domain and depends on
//! I/O boundary traits.

pub mod builder;
pub mod coerce;
pub mod error_ext;

pub use builder::{ConfigTreeBuilder, INITIAL_DATA_SOURCE};
pub use coerce::{Coercer, RawConfig};
pub use error_ext::IoResultExt;
