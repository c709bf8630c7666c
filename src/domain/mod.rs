//! Domain layer: layered values and the trees that hold them
//!
//! This layer is independent of external concerns (no file I/O, no CLI, no settings).

pub mod cell;
pub mod error;
pub mod layers;
mod snapshot;
pub mod tree;
pub mod value;

pub use cell::{LayerEntry, SourcedValue, ValueCell};
pub use error::{ConfigError, ConfigResult, NodeKind};
pub use layers::{Layers, DEFAULT_LAYER};
pub use tree::{ConfigTree, Entry, Node};
pub use value::{ConfigMapping, ConfigValue};
