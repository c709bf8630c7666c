//! Recursive layered configuration tree
//!
//! Every key maps either to a nested `ConfigTree` or to a `ValueCell`; the
//! tree itself never stores raw values. All nodes under one root share the
//! same [`Layers`] instance.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::cell::{LayerEntry, ValueCell};
use crate::domain::error::{ConfigError, ConfigResult, NodeKind};
use crate::domain::layers::Layers;
use crate::domain::value::{mapping_key, render_value, ConfigMapping, ConfigValue};

/// A slot in a configuration tree.
#[derive(Debug)]
pub enum Node {
    Cell(ValueCell),
    Subtree(ConfigTree),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Cell(_) => NodeKind::Value,
            Node::Subtree(_) => NodeKind::Subtree,
        }
    }

    pub fn as_cell(&self) -> Option<&ValueCell> {
        match self {
            Node::Cell(cell) => Some(cell),
            Node::Subtree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            Node::Subtree(tree) => Some(tree),
            Node::Cell(_) => None,
        }
    }

    fn freeze(&mut self) {
        match self {
            Node::Cell(cell) => cell.freeze(),
            Node::Subtree(tree) => tree.freeze(),
        }
    }
}

/// Result of reading a key: a resolved value, or the nested tree itself.
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    Value(&'a ConfigValue),
    Tree(&'a ConfigTree),
}

impl<'a> Entry<'a> {
    pub fn as_value(&self) -> Option<&'a ConfigValue> {
        match self {
            Entry::Value(value) => Some(value),
            Entry::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&'a ConfigTree> {
        match self {
            Entry::Tree(tree) => Some(tree),
            Entry::Value(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct ConfigTree {
    name: String,
    layers: Layers,
    children: IndexMap<String, Node>,
    frozen: bool,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    /// Empty tree with the single default layer.
    pub fn new() -> Self {
        Self::with_layers(Layers::default(), "")
    }

    pub fn with_layers(layers: Layers, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers,
            children: IndexMap::new(),
            frozen: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct child keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Direct children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.node_at(key).is_ok()
    }

    /// Look up a node by key.
    ///
    /// The key is first matched verbatim, then as a dot-separated path.
    pub fn node_at(&self, key: &str) -> ConfigResult<&Node> {
        if let Some(node) = self.children.get(key) {
            return Ok(node);
        }
        match key.split_once('.') {
            Some((head, rest)) => match self.children.get(head) {
                Some(Node::Subtree(tree)) => {
                    tree.node_at(rest).map_err(|e| e.nested_under(head))
                }
                _ => Err(ConfigError::MissingKey {
                    key: key.to_string(),
                }),
            },
            None => Err(ConfigError::MissingKey {
                key: key.to_string(),
            }),
        }
    }

    /// Read a key: subtrees are returned as-is, cells resolve to their
    /// effective value and are marked accessed.
    pub fn get(&self, key: &str) -> ConfigResult<Entry<'_>> {
        match self.node_at(key)? {
            Node::Subtree(tree) => Ok(Entry::Tree(tree)),
            Node::Cell(cell) => cell
                .get_value(None)
                .map(Entry::Value)
                .map_err(|_| missing_value(key, None)),
        }
    }

    /// Effective value of a leaf key.
    pub fn get_value(&self, key: &str) -> ConfigResult<&ConfigValue> {
        self.get_from_layer(key, None)
    }

    /// Value of a leaf key at `layer`, or its effective value when omitted.
    pub fn get_from_layer(&self, key: &str, layer: Option<&str>) -> ConfigResult<&ConfigValue> {
        self.cell_at(key)?
            .get_value(layer)
            .map_err(|_| missing_value(key, layer))
    }

    /// Nested tree under `key`.
    pub fn subtree(&self, key: &str) -> ConfigResult<&ConfigTree> {
        match self.node_at(key)? {
            Node::Subtree(tree) => Ok(tree),
            Node::Cell(_) => Err(ConfigError::TypeMismatch {
                key: key.to_string(),
                expected: NodeKind::Value,
                found: NodeKind::Subtree,
            }),
        }
    }

    /// Deserialize the value or subtree under `key` into `T`.
    ///
    /// Reading a subtree this way marks all of its leaves accessed.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let value = match self.node_at(key)? {
            Node::Cell(cell) => cell
                .get_value(None)
                .map_err(|_| missing_value(key, None))?
                .clone(),
            Node::Subtree(tree) => ConfigValue::Mapping(tree.collect(true)),
        };
        serde_yaml::from_value(value).map_err(|e| ConfigError::Decode {
            input: format!("'{key}'"),
            reason: e.to_string(),
        })
    }

    /// Provenance of a leaf key, lowest precedence first.
    pub fn metadata(&self, key: &str) -> ConfigResult<Vec<LayerEntry>> {
        Ok(self.cell_at(key)?.metadata())
    }

    /// Dotted paths of every leaf whose value has never been read.
    pub fn unused_keys(&self) -> Vec<String> {
        let mut unused = Vec::new();
        self.collect_unused("", &mut unused);
        unused
    }

    /// Plain nested mapping of effective values, without provenance.
    pub fn to_dict(&self) -> ConfigMapping {
        self.collect(false)
    }

    /// Freeze this tree and every descendant. Irreversible.
    #[instrument(level = "debug", skip(self), fields(tree = %self.name))]
    pub fn freeze(&mut self) {
        self.frozen = true;
        for node in self.children.values_mut() {
            node.freeze();
        }
        debug!("configuration frozen");
    }

    /// Bare assignment to an existing key at the highest layer.
    ///
    /// Never creates keys, and fails if the highest layer already holds a
    /// value; layered [`update_mapping`](Self::update_mapping) is the way to
    /// override.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) -> ConfigResult<()> {
        let path = self.path_segments(key)?;
        let mut value = value.into();
        for segment in path.iter().skip(1).rev() {
            let mut wrapped = ConfigMapping::new();
            wrapped.insert(ConfigValue::from(segment.as_str()), value);
            value = ConfigValue::Mapping(wrapped);
        }
        let mut mapping = ConfigMapping::new();
        mapping.insert(ConfigValue::from(path[0].as_str()), value);
        self.update_mapping(mapping, None, None)
    }

    /// Merge an already-coerced mapping into the tree under `layer`
    /// (default: highest). Nothing is modified unless every write is legal.
    #[instrument(level = "debug", skip(self, mapping), fields(tree = %self.name, keys = mapping.len()))]
    pub fn update_mapping(
        &mut self,
        mapping: ConfigMapping,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> ConfigResult<()> {
        self.validate(&mapping, layer)?;
        self.apply(mapping, layer, source)
    }

    /// Equality between trees is not defined.
    pub fn try_eq(&self, _other: &ConfigTree) -> ConfigResult<bool> {
        Err(ConfigError::Unsupported {
            operation: "equality comparison",
        })
    }

    /// Tree view for terminal display; leaves list their layers highest first.
    pub fn to_termtree(&self) -> Tree<String> {
        let root = if self.name.is_empty() {
            "config".to_string()
        } else {
            self.name.clone()
        };
        Tree::new(root).with_leaves(self.termtree_leaves())
    }

    pub(crate) fn from_parts(
        name: String,
        layers: Layers,
        children: IndexMap<String, Node>,
        frozen: bool,
    ) -> Self {
        Self {
            name,
            layers,
            children,
            frozen,
        }
    }

    fn cell_at(&self, key: &str) -> ConfigResult<&ValueCell> {
        match self.node_at(key)? {
            Node::Cell(cell) => Ok(cell),
            Node::Subtree(_) => Err(ConfigError::TypeMismatch {
                key: key.to_string(),
                expected: NodeKind::Subtree,
                found: NodeKind::Value,
            }),
        }
    }

    /// Split `key` the same way [`node_at`](Self::node_at) resolves it.
    fn path_segments(&self, key: &str) -> ConfigResult<Vec<String>> {
        if self.children.contains_key(key) {
            return Ok(vec![key.to_string()]);
        }
        let missing = || ConfigError::MissingKey {
            key: key.to_string(),
        };
        let (head, rest) = key.split_once('.').ok_or_else(missing)?;
        match self.children.get(head) {
            Some(Node::Subtree(tree)) => {
                let mut segments = vec![head.to_string()];
                segments.extend(tree.path_segments(rest).map_err(|e| e.nested_under(head))?);
                Ok(segments)
            }
            _ => Err(missing()),
        }
    }

    fn validate(&self, mapping: &ConfigMapping, layer: Option<&str>) -> ConfigResult<()> {
        if self.frozen {
            let key = mapping
                .keys()
                .next()
                .and_then(mapping_key)
                .unwrap_or_else(|| self.name.clone());
            return Err(ConfigError::Frozen { key });
        }
        let mut seen = HashSet::new();
        for (raw_key, value) in mapping {
            let key = mapping_key(raw_key).ok_or_else(|| ConfigError::Decode {
                input: format!("key {}", render_value(raw_key)),
                reason: "mapping keys must be strings, numbers or booleans".into(),
            })?;
            if !seen.insert(key.clone()) {
                return Err(ConfigError::Decode {
                    input: format!("key '{key}'"),
                    reason: "key appears more than once in the same mapping".into(),
                });
            }
            match (self.children.get(&key), value) {
                (Some(Node::Subtree(tree)), ConfigValue::Mapping(sub)) => {
                    tree.validate(sub, layer).map_err(|e| e.nested_under(&key))?;
                }
                (None, ConfigValue::Mapping(sub)) => {
                    ConfigTree::with_layers(self.layers.clone(), key.as_str())
                        .validate(sub, layer)
                        .map_err(|e| e.nested_under(&key))?;
                }
                (Some(Node::Cell(_)), ConfigValue::Mapping(_)) => {
                    return Err(ConfigError::TypeMismatch {
                        key,
                        expected: NodeKind::Value,
                        found: NodeKind::Subtree,
                    });
                }
                (Some(Node::Subtree(_)), _) => {
                    return Err(ConfigError::TypeMismatch {
                        key,
                        expected: NodeKind::Subtree,
                        found: NodeKind::Value,
                    });
                }
                (Some(Node::Cell(cell)), _) => {
                    cell.check_set(layer)?;
                }
                (None, _) => {
                    ValueCell::new(key.as_str(), self.layers.clone()).check_set(layer)?;
                }
            }
        }
        Ok(())
    }

    fn apply(
        &mut self,
        mapping: ConfigMapping,
        layer: Option<&str>,
        source: Option<&str>,
    ) -> ConfigResult<()> {
        for (raw_key, value) in mapping {
            let key = mapping_key(&raw_key).ok_or_else(|| ConfigError::Decode {
                input: format!("key {}", render_value(&raw_key)),
                reason: "mapping keys must be strings, numbers or booleans".into(),
            })?;
            let layers = self.layers.clone();
            match value {
                ConfigValue::Mapping(sub) => {
                    let node = self
                        .children
                        .entry(key.clone())
                        .or_insert_with(|| Node::Subtree(ConfigTree::with_layers(layers, key.as_str())));
                    match node {
                        Node::Subtree(tree) => tree
                            .apply(sub, layer, source)
                            .map_err(|e| e.nested_under(&key))?,
                        Node::Cell(_) => {
                            return Err(ConfigError::TypeMismatch {
                                key,
                                expected: NodeKind::Value,
                                found: NodeKind::Subtree,
                            })
                        }
                    }
                }
                value => {
                    let node = self
                        .children
                        .entry(key.clone())
                        .or_insert_with(|| Node::Cell(ValueCell::new(key.as_str(), layers)));
                    match node {
                        Node::Cell(cell) => cell.set(value, layer, source)?,
                        Node::Subtree(_) => {
                            return Err(ConfigError::TypeMismatch {
                                key,
                                expected: NodeKind::Subtree,
                                found: NodeKind::Value,
                            })
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn collect(&self, mark_accessed: bool) -> ConfigMapping {
        let mut out = ConfigMapping::new();
        for (key, node) in &self.children {
            let value = match node {
                Node::Subtree(tree) => ConfigValue::Mapping(tree.collect(mark_accessed)),
                Node::Cell(cell) => {
                    let found = if mark_accessed {
                        cell.get_value(None).ok()
                    } else {
                        cell.peek(None).ok().map(|sv| &sv.value)
                    };
                    match found {
                        Some(value) => value.clone(),
                        None => continue,
                    }
                }
            };
            out.insert(ConfigValue::from(key.as_str()), value);
        }
        out
    }

    fn collect_unused(&self, prefix: &str, unused: &mut Vec<String>) {
        for (key, node) in &self.children {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match node {
                Node::Subtree(tree) => tree.collect_unused(&path, unused),
                Node::Cell(cell) if !cell.accessed() => unused.push(path),
                Node::Cell(_) => {}
            }
        }
    }

    fn termtree_leaves(&self) -> Vec<Tree<String>> {
        self.children
            .iter()
            .map(|(key, node)| match node {
                Node::Subtree(tree) => Tree::new(key.clone()).with_leaves(tree.termtree_leaves()),
                Node::Cell(cell) => {
                    let effective = cell
                        .peek(None)
                        .map(|sv| render_value(&sv.value))
                        .unwrap_or_default();
                    let layers = cell.metadata().into_iter().rev().map(|entry| {
                        Tree::new(format!(
                            "{}: {} ({})",
                            entry.layer,
                            render_value(&entry.value),
                            entry.source.as_deref().unwrap_or("unknown")
                        ))
                    });
                    Tree::new(format!("{key} = {effective}")).with_leaves(layers)
                }
            })
            .collect()
    }
}

fn missing_value(key: &str, layer: Option<&str>) -> ConfigError {
    ConfigError::MissingValue {
        key: key.to_string(),
        layer: layer.map(str::to_string),
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `{}` shows each key with its effective layer; `{:#}` adds every layer
/// and its source. Keys without populated values are skipped.
impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, node) in &self.children {
            let rendered = match (node, f.alternate()) {
                (Node::Cell(cell), true) => format!("{cell:#}"),
                (Node::Cell(cell), false) => cell.to_string(),
                (Node::Subtree(tree), true) => format!("{tree:#}"),
                (Node::Subtree(tree), false) => tree.to_string(),
            };
            if rendered.is_empty() {
                continue;
            }
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "{key}:")?;
            write!(f, "{}", indent(&rendered))?;
        }
        Ok(())
    }
}
