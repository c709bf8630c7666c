//! Settings for the `lct` tool with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/lct/lct.toml`
//! 3. Environment variables: `LCT_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::DEFAULT_LAYER;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Output format for dumped configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
    Toml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Toml => write!(f, "toml"),
        }
    }
}

/// Configuration for lct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Layer names, lowest precedence first. Positional files map onto these.
    pub layers: Vec<String>,
    /// Default format for `lct dump`
    pub format: OutputFormat,
    /// Show sources in `lct show`
    pub show_sources: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layers: vec![DEFAULT_LAYER.to_string()],
            format: OutputFormat::default(),
            show_sources: true,
        }
    }
}

/// Get the XDG config directory for lct.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "lct").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("lct.toml"))
}

impl Settings {
    /// Load settings from defaults, the global config file and `LCT_*` variables.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings using `file` in place of the global config file.
    ///
    /// A missing file is skipped.
    pub fn load_from(file: Option<&Path>) -> Result<Self, SettingsError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("layers", defaults.layers)?
            .set_default("format", defaults.format.to_string())?
            .set_default("show_sources", defaults.show_sources)?;

        if let Some(path) = file {
            debug!("settings file: {}", path.display());
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("LCT")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("layers")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Show the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# lct configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/lct/lct.toml
#   Env:    LCT_* environment variables (LCT_LAYERS=base,env,local)

# Layer names, lowest precedence first.
# Positional files given to lct are assigned to these layers in order.
# layers = ["base"]

# Default output format for `lct dump`: yaml, json or toml
# format = "yaml"

# Show the source of every layer in `lct show`
# show_sources = true
"#
        .to_string()
    }
}
