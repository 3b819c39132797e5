//! Configuration loading tests.

use wgapi_config::{CodecLimits, CollectionConfig, DEFAULT_MAX_STRING_LEN};

#[test]
fn test_full_document() {
    let input = r#"
initial_capacity = 32

[limits]
max_entries = 10000
max_string_len = 4096
max_depth = 8
"#;
    let config = CollectionConfig::from_toml_str(input).unwrap();
    assert_eq!(config.initial_capacity, 32);
    assert_eq!(
        config.limits,
        CodecLimits {
            max_entries: 10_000,
            max_string_len: 4096,
            max_depth: 8,
        }
    );
}

#[test]
fn test_toml_roundtrip() {
    let config = CollectionConfig {
        initial_capacity: 4,
        limits: CodecLimits {
            max_entries: 12,
            ..CodecLimits::default()
        },
    };
    let text = config.to_toml_string().unwrap();
    assert_eq!(CollectionConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn test_json_representation() {
    let json = serde_json::to_value(CodecLimits::default()).unwrap();
    assert_eq!(json["max_string_len"], DEFAULT_MAX_STRING_LEN);
    assert_eq!(json["max_depth"], 64);
}
