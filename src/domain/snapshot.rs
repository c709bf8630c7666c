//! Serde support for moving a tree across a process boundary
//!
//! The snapshot keeps every cell's per-layer `(source, value)` rows, the
//! frozen and accessed flags, the root name and the layer ordering. Layers
//! are stored once at the root and shared again on the way back in.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::cell::{LayerEntry, ValueCell};
use crate::domain::error::ConfigResult;
use crate::domain::layers::Layers;
use crate::domain::tree::{ConfigTree, Node};

#[derive(Serialize, Deserialize)]
struct TreeSnapshot {
    name: String,
    layers: Layers,
    frozen: bool,
    children: IndexMap<String, NodeSnapshot>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum NodeSnapshot {
    Value {
        values: Vec<LayerEntry>,
        frozen: bool,
        accessed: bool,
    },
    Subtree {
        frozen: bool,
        children: IndexMap<String, NodeSnapshot>,
    },
}

fn snapshot_children(tree: &ConfigTree) -> IndexMap<String, NodeSnapshot> {
    tree.iter()
        .map(|(key, node)| {
            let snapshot = match node {
                Node::Cell(cell) => NodeSnapshot::Value {
                    values: cell.metadata(),
                    frozen: cell.is_frozen(),
                    accessed: cell.accessed(),
                },
                Node::Subtree(sub) => NodeSnapshot::Subtree {
                    frozen: sub.is_frozen(),
                    children: snapshot_children(sub),
                },
            };
            (key.to_string(), snapshot)
        })
        .collect()
}

fn restore_children(
    layers: &Layers,
    children: IndexMap<String, NodeSnapshot>,
) -> ConfigResult<IndexMap<String, Node>> {
    children
        .into_iter()
        .map(|(key, snapshot)| -> ConfigResult<(String, Node)> {
            let node = match snapshot {
                NodeSnapshot::Value {
                    values,
                    frozen,
                    accessed,
                } => Node::Cell(ValueCell::restore(
                    key.as_str(),
                    layers.clone(),
                    values,
                    frozen,
                    accessed,
                )?),
                NodeSnapshot::Subtree { frozen, children } => {
                    let children =
                        restore_children(layers, children).map_err(|e| e.nested_under(&key))?;
                    Node::Subtree(ConfigTree::from_parts(
                        key.clone(),
                        layers.clone(),
                        children,
                        frozen,
                    ))
                }
            };
            Ok((key, node))
        })
        .collect()
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TreeSnapshot {
            name: self.name().to_string(),
            layers: self.layers().clone(),
            frozen: self.is_frozen(),
            children: snapshot_children(self),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = TreeSnapshot::deserialize(deserializer)?;
        let children = restore_children(&snapshot.layers, snapshot.children)
            .map_err(serde::de::Error::custom)?;
        Ok(ConfigTree::from_parts(
            snapshot.name,
            snapshot.layers,
            children,
            snapshot.frozen,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::ConfigMapping;

    #[test]
    fn given_snapshot_with_unknown_layer_when_deserializing_then_fails() {
        let json = r#"{
            "name": "",
            "layers": ["base"],
            "frozen": false,
            "children": {
                "a": {"kind": "value", "values": [{"layer": "other", "source": null, "value": 1}],
                      "frozen": false, "accessed": false}
            }
        }"#;
        let err = serde_json::from_str::<ConfigTree>(json).unwrap_err();
        assert!(err.to_string().contains("other"));
    }

    #[test]
    fn given_restored_tree_when_inspected_then_layers_are_shared() {
        let mut tree = ConfigTree::with_layers(Layers::new(["a", "b"]).unwrap(), "root");
        let data: ConfigMapping = serde_yaml::from_str("x: {y: 1}").unwrap();
        tree.update_mapping(data, Some("a"), Some("test")).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let restored: ConfigTree = serde_json::from_str(&json).unwrap();
        let x = restored.subtree("x").unwrap();
        assert!(x.layers().ptr_eq(restored.layers()));
        assert_eq!(restored.metadata("x.y").unwrap(), tree.metadata("x.y").unwrap());
    }
}
