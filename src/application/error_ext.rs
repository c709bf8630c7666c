//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::domain::{ConfigError, ConfigResult};

/// Extension trait for converting `io::Result` to `ConfigResult` with context.
pub trait IoResultExt<T> {
    /// Attach the path that was being read.
    ///
    /// # Example
    /// ```ignore
    /// let text = fs.read_to_string(&path).with_path_context(&path)?;
    /// ```
    fn with_path_context(self, path: &Path) -> ConfigResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, path: &Path) -> ConfigResult<T> {
        self.map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
