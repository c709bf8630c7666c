//! Opaque configuration payloads
//!
//! The tree stores leaf values without interpreting them; scalars, lists and
//! nested mappings below a leaf are all just `ConfigValue`s.

use itertools::Itertools;

/// A leaf payload.
pub type ConfigValue = serde_yaml::Value;

/// An insertion-ordered nested mapping, as accepted by coercion.
pub type ConfigMapping = serde_yaml::Mapping;

/// Turn a mapping key into a tree key.
///
/// Strings are taken as-is, numbers and booleans are stringified
/// (YAML allows `1: foo`). Anything else has no key form.
pub fn mapping_key(key: &ConfigValue) -> Option<String> {
    match key {
        ConfigValue::String(s) => Some(s.clone()),
        ConfigValue::Number(n) => Some(n.to_string()),
        ConfigValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Compact single-line rendering used in displays and error messages.
pub fn render_value(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Null => "null".to_string(),
        ConfigValue::Bool(b) => b.to_string(),
        ConfigValue::Number(n) => n.to_string(),
        ConfigValue::String(s) => s.clone(),
        ConfigValue::Sequence(items) => {
            format!("[{}]", items.iter().map(render_value).join(", "))
        }
        ConfigValue::Mapping(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", render_value(k), render_value(v)))
                .join(", ")
        ),
        ConfigValue::Tagged(tagged) => format!("{} {}", tagged.tag, render_value(&tagged.value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_value_when_rendering_then_uses_flow_style() {
        let value: ConfigValue = serde_yaml::from_str("{a: [1, two], b: true}").unwrap();
        assert_eq!(render_value(&value), "{a: [1, two], b: true}");
    }

    #[test]
    fn given_scalar_keys_when_converting_then_stringifies() {
        assert_eq!(mapping_key(&ConfigValue::from("k")), Some("k".to_string()));
        assert_eq!(mapping_key(&ConfigValue::from(3)), Some("3".to_string()));
        assert_eq!(mapping_key(&ConfigValue::Bool(true)), Some("true".to_string()));
        assert_eq!(mapping_key(&ConfigValue::Sequence(vec![])), None);
    }
}
