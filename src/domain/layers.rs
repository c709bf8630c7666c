//! Shared layer ordering
//!
//! Precedence (lowest to highest) follows position: the last layer wins
//! whenever no explicit layer is requested.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::{ConfigError, ConfigResult};

/// Name of the implicit layer used when no ordering is given.
pub const DEFAULT_LAYER: &str = "base";

/// Ordered, immutable list of distinct layer names.
///
/// Cloning shares the underlying list, so every cell and subtree created
/// from one root refers to the same ordering.
#[derive(Debug, Clone)]
pub struct Layers(Arc<[String]>);

impl Layers {
    pub fn new<I, S>(names: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ConfigError::InvalidLayers {
                reason: "at least one layer is required".into(),
            });
        }
        let mut seen = HashSet::new();
        for name in &names {
            if name.is_empty() {
                return Err(ConfigError::InvalidLayers {
                    reason: "layer names must not be empty".into(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::InvalidLayers {
                    reason: format!("layer '{name}' appears more than once"),
                });
            }
        }
        Ok(Self(names.into()))
    }

    /// Highest-precedence layer: the target of writes without an explicit layer.
    pub fn highest(&self) -> &str {
        &self.0[self.0.len() - 1]
    }

    /// Lowest-precedence layer: the target of construction data.
    pub fn lowest(&self) -> &str {
        &self.0[0]
    }

    pub fn contains(&self, layer: &str) -> bool {
        self.0.iter().any(|l| l == layer)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: an ordering has at least one layer.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Layers from lowest to highest precedence.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// True when both orderings are the same shared instance.
    pub fn ptr_eq(&self, other: &Layers) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self(Arc::from(vec![DEFAULT_LAYER.to_string()]))
    }
}

impl PartialEq for Layers {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Layers {}

impl fmt::Display for Layers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" < "))
    }
}

impl Serialize for Layers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Layers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Layers::new(names).map_err(serde::de::Error::custom)
    }
}
