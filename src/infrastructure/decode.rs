//! Structured text decoding (YAML, TOML, JSON)

use std::fmt;
use std::path::Path;

use crate::domain::{ConfigMapping, ConfigValue};

/// Text format of a configuration document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// Pick the format from a file extension; anything unknown is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Format::Toml,
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }

    /// Whether `path` carries an extension this crate knows how to decode.
    pub fn is_config_path(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml" | "yml" | "toml" | "json")
        )
    }

    /// Decode `text` into a top-level mapping.
    ///
    /// An empty (or `null`) document is the empty mapping.
    pub fn decode(&self, text: &str) -> Result<ConfigMapping, String> {
        let value: ConfigValue = match self {
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string())?,
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string())?,
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string())?,
        };
        match value {
            ConfigValue::Mapping(mapping) => Ok(mapping),
            ConfigValue::Null => Ok(ConfigMapping::new()),
            other => Err(format!(
                "expected a mapping at the top level, found {}",
                kind_name(&other)
            )),
        }
    }
}

fn kind_name(value: &ConfigValue) -> &'static str {
    match value {
        ConfigValue::Null => "null",
        ConfigValue::Bool(_) => "a boolean",
        ConfigValue::Number(_) => "a number",
        ConfigValue::String(_) => "a string",
        ConfigValue::Sequence(_) => "a sequence",
        ConfigValue::Mapping(_) => "a mapping",
        ConfigValue::Tagged(_) => "a tagged value",
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => write!(f, "YAML"),
            Format::Toml => write!(f, "TOML"),
            Format::Json => write!(f, "JSON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("config.toml", Format::Toml)]
    #[case("config.json", Format::Json)]
    #[case("config.yaml", Format::Yaml)]
    #[case("config.yml", Format::Yaml)]
    #[case("config", Format::Yaml)]
    fn given_path_when_detecting_format_then_uses_extension(
        #[case] path: &str,
        #[case] expected: Format,
    ) {
        assert_eq!(Format::from_path(Path::new(path)), expected);
    }

    #[test]
    fn given_equivalent_documents_when_decoding_then_mappings_match() {
        let yaml = Format::Yaml
            .decode("key1:\n  sub_key1: [val, val]\n  sub_key2: val\nkey2: val")
            .unwrap();
        let toml = Format::Toml
            .decode("key2 = \"val\"\n[key1]\nsub_key1 = [\"val\", \"val\"]\nsub_key2 = \"val\"\n")
            .unwrap();
        let json = Format::Json
            .decode(r#"{"key1": {"sub_key1": ["val", "val"], "sub_key2": "val"}, "key2": "val"}"#)
            .unwrap();
        assert_eq!(ConfigValue::Mapping(yaml.clone()), ConfigValue::Mapping(json));
        // TOML tables land after plain keys, so compare per key.
        assert_eq!(toml.get("key1"), yaml.get("key1"));
        assert_eq!(toml.get("key2"), yaml.get("key2"));
    }

    #[test]
    fn given_empty_document_when_decoding_then_empty_mapping() {
        assert!(Format::Yaml.decode("").unwrap().is_empty());
    }

    #[test]
    fn given_scalar_document_when_decoding_then_fails() {
        let err = Format::Yaml.decode("just a string").unwrap_err();
        assert!(err.contains("a string"));
        assert!(Format::Yaml.decode("key: [unclosed").is_err());
    }
}
