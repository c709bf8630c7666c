//! Per-key value resolution
//!
//! A `ValueCell` holds at most one value per layer for a single configuration
//! key, remembers where each value came from, and records whether the key
//! has ever been read.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::error::{ConfigError, ConfigResult};
use crate::domain::layers::Layers;
use crate::domain::value::{render_value, ConfigValue};

/// A value together with the source that supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedValue {
    pub source: Option<String>,
    pub value: ConfigValue,
}

/// One row of provenance for a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub layer: String,
    pub source: Option<String>,
    pub value: ConfigValue,
}

/// Leaf of a configuration tree.
#[derive(Debug)]
pub struct ValueCell {
    name: String,
    layers: Layers,
    values: HashMap<String, SourcedValue>,
    frozen: bool,
    accessed: AtomicBool,
}

impl ValueCell {
    pub fn new(name: impl Into<String>, layers: Layers) -> Self {
        Self {
            name: name.into(),
            layers,
            values: HashMap::new(),
            frozen: false,
            accessed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Whether the effective value has been resolved at least once.
    pub fn accessed(&self) -> bool {
        self.accessed.load(Ordering::Relaxed)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of populated layers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check that a write to `layer` (default: highest) would succeed.
    ///
    /// Returns the layer the write would land in.
    pub fn check_set<'a>(&'a self, layer: Option<&'a str>) -> ConfigResult<&'a str> {
        if self.frozen {
            return Err(ConfigError::Frozen {
                key: self.name.clone(),
            });
        }
        let layer = match layer {
            Some(layer) if !self.layers.contains(layer) => {
                return Err(ConfigError::UnknownLayer {
                    key: self.name.clone(),
                    layer: layer.to_string(),
                });
            }
            Some(layer) => layer,
            None => self.layers.highest(),
        };
        if let Some(existing) = self.values.get(layer) {
            return Err(ConfigError::DuplicateValue {
                key: self.name.clone(),
                layer: layer.to_string(),
                value_source: existing.source.clone(),
                value: existing.value.clone(),
            });
        }
        Ok(layer)
    }

    /// Write `value` under `layer`, or under the highest layer when omitted.
    pub fn set(
        &mut self,
        value: ConfigValue,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> ConfigResult<()> {
        let layer = self.check_set(layer)?.to_string();
        trace!(key = %self.name, %layer, "set value");
        self.values.insert(
            layer,
            SourcedValue {
                source: source.map(str::to_string),
                value,
            },
        );
        Ok(())
    }

    /// Resolve `(source, value)` at `layer`, or at the highest populated layer.
    ///
    /// Marks the cell as accessed on success.
    pub fn resolve(&self, layer: Option<&str>) -> ConfigResult<(Option<&str>, &ConfigValue)> {
        let found = self.peek(layer)?;
        self.accessed.store(true, Ordering::Relaxed);
        Ok((found.source.as_deref(), &found.value))
    }

    /// Effective value at `layer` (default: highest populated).
    pub fn get_value(&self, layer: Option<&str>) -> ConfigResult<&ConfigValue> {
        self.resolve(layer).map(|(_, value)| value)
    }

    /// Like [`resolve`](Self::resolve) without touching the accessed flag.
    pub fn peek(&self, layer: Option<&str>) -> ConfigResult<&SourcedValue> {
        let found = match layer {
            Some(layer) => self.values.get(layer),
            None => self
                .layers
                .iter()
                .rev()
                .find_map(|layer| self.values.get(layer)),
        };
        found.ok_or_else(|| ConfigError::MissingValue {
            key: self.name.clone(),
            layer: layer.map(str::to_string),
        })
    }

    /// Provenance from lowest to highest precedence.
    pub fn metadata(&self) -> Vec<LayerEntry> {
        self.layers
            .iter()
            .filter_map(|layer| {
                self.values.get(layer).map(|sv| LayerEntry {
                    layer: layer.to_string(),
                    source: sv.source.clone(),
                    value: sv.value.clone(),
                })
            })
            .collect()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn restore(
        name: impl Into<String>,
        layers: Layers,
        entries: Vec<LayerEntry>,
        frozen: bool,
        accessed: bool,
    ) -> ConfigResult<Self> {
        let mut cell = Self::new(name, layers);
        for entry in entries {
            cell.set(entry.value, Some(&entry.layer), entry.source.as_deref())?;
        }
        cell.frozen = frozen;
        cell.accessed = AtomicBool::new(accessed);
        Ok(cell)
    }

    /// Populated layers from highest to lowest precedence.
    fn populated_desc(&self) -> impl Iterator<Item = (&str, &SourcedValue)> {
        self.layers
            .iter()
            .rev()
            .filter_map(|layer| self.values.get(layer).map(|sv| (layer, sv)))
    }
}

/// `{}` shows the effective layer only; `{:#}` lists every populated layer
/// with its source, most-overriding first.
impl fmt::Display for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            let mut first = true;
            for (layer, sv) in self.populated_desc() {
                if !first {
                    writeln!(f)?;
                }
                first = false;
                writeln!(f, "{layer}: {}", render_value(&sv.value))?;
                write!(f, "    source: {}", sv.source.as_deref().unwrap_or("unknown"))?;
            }
            Ok(())
        } else {
            match self.populated_desc().next() {
                Some((layer, sv)) => write!(f, "{layer}: {}", render_value(&sv.value)),
                None => Ok(()),
            }
        }
    }
}
