//! Tests for ConfigTree reads, writes and provenance

use rstest::rstest;

use layered_config_tree::domain::{ConfigError, ConfigMapping, ConfigTree, ConfigValue, Entry};
use layered_config_tree::util::testing;

fn mapping(yaml: &str) -> ConfigMapping {
    serde_yaml::from_str(yaml).unwrap()
}

fn key1_tree() -> ConfigTree {
    let mut tree = ConfigTree::builder()
        .layers(["base", "override_1", "override_2"])
        .build()
        .unwrap();
    tree.update("Key1: value_ov_2", Some("override_2"), Some("ov2_src"))
        .unwrap();
    tree.update("Key1: value_base", Some("base"), Some("base_src"))
        .unwrap();
    tree.update("Key1: value_ov_1", Some("override_1"), Some("ov1_src"))
        .unwrap();
    tree
}

#[test]
fn given_three_layers_when_reading_key1_then_highest_wins() {
    testing::init_test_setup();
    // Arrange
    let tree = key1_tree();

    // Act
    let resolved = tree.get_value("Key1").unwrap();
    let meta = tree.metadata("Key1").unwrap();

    // Assert
    assert_eq!(resolved, &ConfigValue::from("value_ov_2"));
    let rows: Vec<(&str, Option<&str>, &ConfigValue)> = meta
        .iter()
        .map(|e| (e.layer.as_str(), e.source.as_deref(), &e.value))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("base", Some("base_src"), &ConfigValue::from("value_base")),
            ("override_1", Some("ov1_src"), &ConfigValue::from("value_ov_1")),
            ("override_2", Some("ov2_src"), &ConfigValue::from("value_ov_2")),
        ]
    );
}

#[test]
fn given_key1_tree_when_displaying_then_layers_listed_highest_first() {
    let tree = key1_tree();

    assert_eq!(tree.to_string(), "Key1:\n    override_2: value_ov_2");
    assert_eq!(
        format!("{tree:#}"),
        "Key1:\n\
         \x20   override_2: value_ov_2\n\
         \x20       source: ov2_src\n\
         \x20   override_1: value_ov_1\n\
         \x20       source: ov1_src\n\
         \x20   base: value_base\n\
         \x20       source: base_src"
    );
}

#[test]
fn given_single_layer_tree_when_reading_leaves_then_unused_keys_shrink() {
    // Arrange
    let tree = ConfigTree::from_raw(mapping("a: {b: v, c: v2}")).unwrap();
    assert_eq!(tree.unused_keys(), vec!["a.b".to_string(), "a.c".to_string()]);

    // Act
    let b = tree.subtree("a").unwrap().get_value("b").unwrap();

    // Assert
    assert_eq!(b, &ConfigValue::from("v"));
    assert_eq!(tree.unused_keys(), vec!["a.c".to_string()]);
}

#[test]
fn given_read_key_when_writing_other_keys_then_stays_used() {
    // Arrange
    let mut tree = ConfigTree::builder()
        .layers(["base", "local"])
        .data("a: 1\nb: 2")
        .build()
        .unwrap();
    let _ = tree.get_value("a").unwrap();

    // Act
    tree.update("a: 10\nc: 3", Some("local"), None).unwrap();

    // Assert
    let unused = tree.unused_keys();
    assert!(!unused.contains(&"a".to_string()));
    assert_eq!(unused, vec!["b".to_string(), "c".to_string()]);
}

#[rstest]
#[case("a: 1")]
#[case("a: {b: {c: [1, 2, 3]}, d: text}\ne: true")]
#[case("key1: {sub_key1: [val, val, val], sub_key2: val}\nkey2: val")]
#[case("")]
fn given_single_layer_input_when_dumping_then_round_trips(#[case] yaml: &str) {
    // Arrange
    let input = mapping(if yaml.is_empty() { "{}" } else { yaml });

    // Act
    let tree = ConfigTree::from_raw(input.clone()).unwrap();

    // Assert
    assert_eq!(tree.to_dict(), input);
}

#[test]
fn given_existing_key_when_setting_then_writes_highest_layer_once() {
    // Arrange
    let mut tree = ConfigTree::builder()
        .layers(["base", "local"])
        .data("db: {port: 5432}")
        .build()
        .unwrap();

    // Act
    tree.set("db.port", 6543).unwrap();
    let second = tree.set("db.port", 7654);

    // Assert
    assert_eq!(tree.get_value("db.port").unwrap(), &ConfigValue::from(6543));
    assert_eq!(tree.metadata("db.port").unwrap()[1].layer, "local");
    assert!(matches!(second, Err(ConfigError::DuplicateValue { .. })));
}

#[test]
fn given_missing_key_when_setting_then_missing_key() {
    let mut tree = ConfigTree::from_raw("a: 1").unwrap();

    let err = tree.set("b", 2).unwrap_err();

    assert!(matches!(err, ConfigError::MissingKey { .. }));
    assert!(err.is_key_error());
    assert!(!tree.contains_key("b"));
}

#[test]
fn given_update_without_layer_when_applied_then_lands_in_highest() {
    let mut tree = ConfigTree::builder()
        .layers(["base", "env", "cli"])
        .build()
        .unwrap();

    tree.update("x: 1", None, Some("flags")).unwrap();

    let meta = tree.metadata("x").unwrap();
    assert_eq!(meta.len(), 1);
    assert_eq!(meta[0].layer, "cli");
    assert!(matches!(
        tree.update("x: 2", None, None),
        Err(ConfigError::DuplicateValue { .. })
    ));
}

#[test]
fn given_layer_specific_read_when_layer_empty_then_missing_value() {
    let tree = key1_tree();

    assert_eq!(
        tree.get_from_layer("Key1", Some("base")).unwrap(),
        &ConfigValue::from("value_base")
    );
    let err = ConfigTree::builder()
        .layers(["base", "local"])
        .data("k: v")
        .build()
        .unwrap()
        .get_from_layer("k", Some("local"))
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingValue { .. }));
}

#[test]
fn given_subtree_when_getting_then_returns_tree_entry() {
    let tree = ConfigTree::from_raw("server: {host: localhost}").unwrap();

    match tree.get("server").unwrap() {
        Entry::Tree(server) => {
            assert_eq!(server.name(), "server");
            assert_eq!(server.keys().collect::<Vec<_>>(), vec!["host"]);
        }
        Entry::Value(v) => panic!("expected subtree, got {v:?}"),
    }
    assert!(tree.get("server.host").unwrap().as_value().is_some());
    assert!(matches!(
        tree.get("nope"),
        Err(ConfigError::MissingKey { .. })
    ));
}
