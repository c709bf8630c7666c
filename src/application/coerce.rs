//! Coercion of raw input into nested mappings
//!
//! Input arrives as an already-nested mapping, as structured text, or as a
//! path to a file containing such text. Everything leaves as a mapping.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::error_ext::IoResultExt;
use crate::domain::{ConfigError, ConfigMapping, ConfigResult};
use crate::infrastructure::{FileSystem, Format, RealFileSystem};
use crate::util::path::expand_path;

/// Raw configuration input.
#[derive(Debug, Clone, PartialEq)]
pub enum RawConfig {
    /// Already-nested mapping, used as-is.
    Mapping(ConfigMapping),
    /// Structured text, decoded in the coercer's text format (YAML by default).
    Text(String),
    /// Path to a file, decoded by extension.
    File(PathBuf),
}

impl RawConfig {
    pub fn text(text: impl Into<String>) -> Self {
        RawConfig::Text(text.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        RawConfig::File(path.into())
    }
}

impl From<ConfigMapping> for RawConfig {
    fn from(mapping: ConfigMapping) -> Self {
        RawConfig::Mapping(mapping)
    }
}

/// A single-line string ending in a known config extension is a file path;
/// anything else is text. When no file exists at such a path, the coercer
/// decodes the string as text instead (`"include: base.yaml"`).
impl From<&str> for RawConfig {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        if !trimmed.contains('\n') && Format::is_config_path(Path::new(trimmed)) {
            RawConfig::File(PathBuf::from(trimmed))
        } else {
            RawConfig::Text(s.to_string())
        }
    }
}

impl From<String> for RawConfig {
    fn from(s: String) -> Self {
        RawConfig::from(s.as_str())
    }
}

impl From<PathBuf> for RawConfig {
    fn from(path: PathBuf) -> Self {
        RawConfig::File(path)
    }
}

impl From<&Path> for RawConfig {
    fn from(path: &Path) -> Self {
        RawConfig::File(path.to_path_buf())
    }
}

/// Turns [`RawConfig`] into mappings, reading files through a [`FileSystem`].
#[derive(Clone)]
pub struct Coercer {
    fs: Arc<dyn FileSystem>,
    text_format: Format,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(Arc::new(RealFileSystem))
    }
}

impl std::fmt::Debug for Coercer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coercer")
            .field("text_format", &self.text_format)
            .finish_non_exhaustive()
    }
}

impl Coercer {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            text_format: Format::Yaml,
        }
    }

    /// Decode [`RawConfig::Text`] input as `format` instead of YAML.
    pub fn with_text_format(mut self, format: Format) -> Self {
        self.text_format = format;
        self
    }

    /// Coerce `raw` into a mapping and the source to attribute it to.
    ///
    /// For file input without an explicit source, the source becomes the
    /// path as given. A file path that does not exist but decodes as a
    /// mapping in the text format is treated as text.
    #[instrument(level = "debug", skip(self, raw))]
    pub fn coerce(
        &self,
        raw: RawConfig,
        source: Option<&str>,
    ) -> ConfigResult<(ConfigMapping, Option<String>)> {
        let source = source.map(str::to_string);
        match raw {
            RawConfig::Mapping(mapping) => Ok((mapping, source)),
            RawConfig::Text(text) => {
                let mapping =
                    self.text_format
                        .decode(&text)
                        .map_err(|reason| ConfigError::Decode {
                            input: format!("{} text", self.text_format),
                            reason,
                        })?;
                Ok((mapping, source))
            }
            RawConfig::File(path) => {
                let expanded = expand_path(&path);
                if !self.fs.exists(&expanded) {
                    if let Some(mapping) = path
                        .to_str()
                        .and_then(|text| self.text_format.decode(text).ok())
                    {
                        debug!("no file at {}, decoded as text", expanded.display());
                        return Ok((mapping, source));
                    }
                }
                debug!("reading {}", expanded.display());
                let content = self
                    .fs
                    .read_to_string(&expanded)
                    .with_path_context(&expanded)?;
                let mapping = Format::from_path(&expanded).decode(&content).map_err(|reason| {
                    ConfigError::Decode {
                        input: expanded.display().to_string(),
                        reason,
                    }
                })?;
                let source = source.or_else(|| Some(path.display().to_string()));
                Ok((mapping, source))
            }
        }
    }
}
