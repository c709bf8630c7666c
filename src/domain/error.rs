//! Domain-level errors (no external dependencies beyond the value model)

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::value::{render_value, ConfigValue};

/// Kind of slot stored under a tree key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A leaf holding per-layer values.
    Value,
    /// A nested configuration tree.
    Subtree,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Value => write!(f, "value"),
            NodeKind::Subtree => write!(f, "subtree"),
        }
    }
}

/// Errors raised by cells and trees.
///
/// Every variant that concerns a specific key carries its dotted path
/// from the tree that reported it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration key named '{key}'")]
    MissingKey { key: String },

    #[error("no value for '{key}'{}", .layer.as_ref().map(|l| format!(" in layer '{l}'")).unwrap_or_default())]
    MissingValue { key: String, layer: Option<String> },

    #[error("cannot set '{key}': layer '{layer}' is not part of the layer ordering")]
    UnknownLayer { key: String, layer: String },

    #[error(
        "duplicate value for '{key}' in layer '{layer}' (source: {}, value: {})",
        .value_source.as_deref().unwrap_or("unknown"),
        render_value(.value)
    )]
    DuplicateValue {
        key: String,
        layer: String,
        value_source: Option<String>,
        value: ConfigValue,
    },

    #[error("cannot set '{key}': configuration is frozen")]
    Frozen { key: String },

    #[error("'{key}' holds a {expected}, not a {found}")]
    TypeMismatch {
        key: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("cannot decode {input}: {reason}")]
    Decode { input: String, reason: String },

    #[error("cannot read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid layer ordering: {reason}")]
    InvalidLayers { reason: String },

    #[error("{operation} is not supported for configuration trees")]
    Unsupported { operation: &'static str },
}

impl ConfigError {
    /// True for lookup failures: missing keys, missing values and unknown layers.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            ConfigError::MissingKey { .. }
                | ConfigError::MissingValue { .. }
                | ConfigError::UnknownLayer { .. }
        )
    }

    /// The offending key, when the error concerns one.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::MissingKey { key }
            | ConfigError::MissingValue { key, .. }
            | ConfigError::UnknownLayer { key, .. }
            | ConfigError::DuplicateValue { key, .. }
            | ConfigError::Frozen { key }
            | ConfigError::TypeMismatch { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }

    /// Prefix the carried key with `parent`, producing a dotted path.
    pub fn nested_under(mut self, parent: &str) -> Self {
        if parent.is_empty() {
            return self;
        }
        match &mut self {
            ConfigError::MissingKey { key }
            | ConfigError::MissingValue { key, .. }
            | ConfigError::UnknownLayer { key, .. }
            | ConfigError::DuplicateValue { key, .. }
            | ConfigError::Frozen { key }
            | ConfigError::TypeMismatch { key, .. } => {
                *key = if key.is_empty() {
                    parent.to_string()
                } else {
                    format!("{parent}.{key}")
                };
            }
            _ => {}
        }
        self
    }
}

/// Result type for tree and cell operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_error_when_prefixing_then_builds_dotted_path() {
        let err = ConfigError::Frozen { key: "c".into() }
            .nested_under("b")
            .nested_under("a");
        assert_eq!(err.key(), Some("a.b.c"));
        assert_eq!(err.to_string(), "cannot set 'a.b.c': configuration is frozen");
    }

    #[test]
    fn given_lookup_failures_when_classifying_then_they_are_key_errors() {
        assert!(ConfigError::MissingKey { key: "a".into() }.is_key_error());
        assert!(ConfigError::MissingValue {
            key: "a".into(),
            layer: None
        }
        .is_key_error());
        assert!(!ConfigError::Frozen { key: "a".into() }.is_key_error());
    }

    #[test]
    fn given_duplicate_value_when_displaying_then_includes_provenance() {
        let err = ConfigError::DuplicateValue {
            key: "port".into(),
            layer: "base".into(),
            value_source: Some("defaults.yaml".into()),
            value: ConfigValue::from(8080),
        };
        let msg = err.to_string();
        assert!(msg.contains("'port'"));
        assert!(msg.contains("defaults.yaml"));
        assert!(msg.contains("8080"));
    }
}
