//! Tests for moving trees across a process boundary with serde

use layered_config_tree::domain::{ConfigError, ConfigTree};

fn layered_tree() -> ConfigTree {
    let mut tree = ConfigTree::builder()
        .layers(["base", "env", "cli"])
        .name("app")
        .data("db: {host: localhost, port: 5432}\nlog: {level: info}\nfeatures: [a, b]")
        .source("defaults.yaml")
        .build()
        .unwrap();
    tree.update("db: {port: 6543}", Some("env"), Some("APP_DB_PORT"))
        .unwrap();
    tree.update("log: {level: debug}", Some("cli"), None).unwrap();
    tree
}

#[test]
fn given_tree_when_round_tripping_json_then_state_is_identical() {
    // Arrange
    let tree = layered_tree();
    let _ = tree.get_value("db.port").unwrap();

    // Act
    let json = serde_json::to_string(&tree).unwrap();
    let restored: ConfigTree = serde_json::from_str(&json).unwrap();

    // Assert
    assert_eq!(restored.name(), "app");
    assert_eq!(restored.layers(), tree.layers());
    assert_eq!(restored.is_frozen(), tree.is_frozen());
    assert_eq!(restored.to_dict(), tree.to_dict());
    assert_eq!(restored.unused_keys(), tree.unused_keys());
    for key in ["db.host", "db.port", "log.level", "features"] {
        assert_eq!(restored.metadata(key).unwrap(), tree.metadata(key).unwrap());
    }
    assert_eq!(format!("{restored:#}"), format!("{tree:#}"));
}

#[test]
fn given_frozen_tree_when_round_tripping_then_still_frozen() {
    // Arrange
    let mut tree = layered_tree();
    tree.freeze();

    // Act
    let json = serde_json::to_string(&tree).unwrap();
    let mut restored: ConfigTree = serde_json::from_str(&json).unwrap();

    // Assert
    assert!(restored.is_frozen());
    assert!(restored.subtree("db").unwrap().is_frozen());
    let err = restored.update("db: {host: remote}", Some("cli"), None).unwrap_err();
    assert!(matches!(err, ConfigError::Frozen { .. }));
}

#[test]
fn given_tree_when_round_tripping_yaml_then_state_is_identical() {
    let tree = layered_tree();

    let yaml = serde_yaml::to_string(&tree).unwrap();
    let restored: ConfigTree = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(restored.to_dict(), tree.to_dict());
    assert_eq!(restored.metadata("db.port").unwrap(), tree.metadata("db.port").unwrap());
}

#[test]
fn given_duplicate_layer_in_snapshot_when_deserializing_then_fails() {
    let json = r#"{"name": "", "layers": ["base", "base"], "frozen": false, "children": {}}"#;
    assert!(serde_json::from_str::<ConfigTree>(json).is_err());
}
