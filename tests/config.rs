use assert_matches::assert_matches;

use hirise_dl::config::{Config, ConfigLoader};
use hirise_dl::domain::{Ccd, Channel, ProductKind};
use hirise_dl::error::HiriseError;

#[test]
fn resolve_mixed_entries() {
    let content = r#"{
        "schema_version": 1,
        "data_root": "/data/hirise",
        "sources": [
            "PSP_003092_0985_RED4_0",
            { "observation": "PSP_003092_0985", "ccd": "IR10", "channel": 1 }
        ],
        "labels": [
            "ESP_011491_0985_COLOR",
            { "observation": "ESP_011491_0985" }
        ]
    }"#;

    let config: Config = serde_json::from_str(content).unwrap();
    let resolved = ConfigLoader::resolve_config(config).unwrap();

    assert_eq!(resolved.schema_version, 1);
    assert_eq!(resolved.data_root.as_deref().map(|p| p.as_str()), Some("/data/hirise"));

    assert_eq!(resolved.sources.len(), 2);
    assert_eq!(resolved.sources[0].to_string(), "PSP_003092_0985_RED4_0");
    assert_eq!(resolved.sources[1].ccd(), Ccd::Ir10);
    assert_eq!(resolved.sources[1].channel(), Channel::One);

    assert_eq!(resolved.labels.len(), 2);
    assert_eq!(resolved.labels[0].kind(), ProductKind::Color);
    // kind defaults to RED when the entry names only the observation
    assert_eq!(resolved.labels[1].kind(), ProductKind::Red);
}

#[test]
fn invalid_source_id_fails_resolution() {
    let content = r#"{ "sources": ["PSP_003092_0985_RED4_7"] }"#;
    let config: Config = serde_json::from_str(content).unwrap();
    let err = ConfigLoader::resolve_config(config).unwrap_err();
    assert_matches!(err, HiriseError::InvalidChannel(_));
}

#[test]
fn invalid_channel_in_detailed_entry() {
    let content =
        r#"{ "sources": [{ "observation": "PSP_003092_0985", "ccd": "RED4", "channel": 2 }] }"#;
    let config: Config = serde_json::from_str(content).unwrap();
    let err = ConfigLoader::resolve_config(config).unwrap_err();
    assert_matches!(err, HiriseError::InvalidChannel(_));
}

#[test]
fn missing_config_file_is_a_typed_error() {
    let err = ConfigLoader::resolve(Some("/nonexistent/hirise-dl.json")).unwrap_err();
    assert_matches!(err, HiriseError::ConfigRead(_));
}
