//! Building and updating trees from raw input

use tracing::{debug, instrument};

use crate::application::coerce::{Coercer, RawConfig};
use crate::domain::{ConfigResult, ConfigTree, Layers};

/// Source recorded for construction data given without a source or a path.
pub const INITIAL_DATA_SOURCE: &str = "initial data";

/// Builder for a [`ConfigTree`].
///
/// ```ignore
/// let tree = ConfigTree::builder()
///     .layers(["base", "env", "cli"])
///     .data("app.yaml")
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ConfigTreeBuilder {
    layers: Option<Vec<String>>,
    name: String,
    data: Option<RawConfig>,
    source: Option<String>,
    coercer: Option<Coercer>,
}

impl ConfigTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer names, lowest precedence first. Defaults to a single `base` layer.
    pub fn layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = Some(layers.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Initial data, written at the lowest layer.
    pub fn data(mut self, data: impl Into<RawConfig>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Source recorded for the initial data. Defaults to the file path for
    /// file input and to [`INITIAL_DATA_SOURCE`] otherwise.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn coercer(mut self, coercer: Coercer) -> Self {
        self.coercer = Some(coercer);
        self
    }

    #[instrument(level = "debug", skip_all)]
    pub fn build(self) -> ConfigResult<ConfigTree> {
        let layers = match self.layers {
            Some(names) => Layers::new(names)?,
            None => Layers::default(),
        };
        debug!("building '{}' with layers {layers}", self.name);
        let mut tree = ConfigTree::with_layers(layers, self.name);
        if let Some(data) = self.data {
            let coercer = self.coercer.unwrap_or_default();
            let (mapping, source) = coercer.coerce(data, self.source.as_deref())?;
            let source = source.unwrap_or_else(|| INITIAL_DATA_SOURCE.to_string());
            let lowest = tree.layers().lowest().to_string();
            tree.update_mapping(mapping, Some(&lowest), Some(&source))?;
        }
        Ok(tree)
    }
}

impl ConfigTree {
    pub fn builder() -> ConfigTreeBuilder {
        ConfigTreeBuilder::new()
    }

    /// Single-layer tree holding `raw`.
    pub fn from_raw(raw: impl Into<RawConfig>) -> ConfigResult<ConfigTree> {
        ConfigTreeBuilder::new().data(raw).build()
    }

    /// Merge `raw` into the tree under `layer` (default: highest).
    ///
    /// Fails without modifying the tree if any leaf already has a value at
    /// `layer`, if `layer` is unknown, or if the tree is frozen.
    pub fn update(
        &mut self,
        raw: impl Into<RawConfig>,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> ConfigResult<()> {
        self.update_with(&Coercer::default(), raw, layer, source)
    }

    /// Like [`update`](Self::update), coercing through `coercer`.
    pub fn update_with(
        &mut self,
        coercer: &Coercer,
        raw: impl Into<RawConfig>,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> ConfigResult<()> {
        let (mapping, source) = coercer.coerce(raw.into(), source)?;
        self.update_mapping(mapping, layer, source.as_deref())
    }
}
