//! Layered configuration trees
//!
//! A [`ConfigTree`] maps keys to nested trees or to [`ValueCell`]s. Each cell
//! holds at most one value per named layer and resolves reads to the
//! highest-precedence layer that has one, remembering the source of every
//! value and whether it has ever been read.
//!
//! ```ignore
//! let mut config = ConfigTree::builder()
//!     .layers(["base", "env", "cli"])
//!     .data("defaults.yaml")
//!     .build()?;
//! config.update("db: {port: 6543}", Some("cli"), Some("flags"))?;
//! assert_eq!(config.get_value("db.port")?, &ConfigValue::from(6543));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{Coercer, ConfigTreeBuilder, RawConfig};
pub use domain::{
    ConfigError, ConfigMapping, ConfigResult, ConfigTree, ConfigValue, Entry, LayerEntry, Layers,
    Node, NodeKind, SourcedValue, ValueCell,
};
pub use infrastructure::{FileSystem, Format, RealFileSystem};
