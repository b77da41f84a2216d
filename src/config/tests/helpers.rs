//! Shared test helpers for configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::MarginaliaConfig;

/// Applies a configuration layer to the composer based on the layer type.
pub fn apply_layer(composer: &mut MergeComposer, layer_type: &str, value: Value) {
    match layer_type {
        "defaults" => composer.push_defaults(value),
        "file" => composer.push_file(value, None),
        "environment" => composer.push_environment(value),
        "cli" => composer.push_cli(value),
        _ => panic!("unknown layer type: {layer_type}"),
    }
}

/// Helper to compose a [`MarginaliaConfig`] from `(layer_type, value)` pairs.
pub fn build_config_from_layers(layers: &[(&str, Value)]) -> MarginaliaConfig {
    let mut composer = MergeComposer::new();

    for (layer_type, value) in layers {
        apply_layer(&mut composer, layer_type, value.clone());
    }

    MarginaliaConfig::merge_from_layers(composer.layers()).expect("merge should succeed")
}

/// A configuration with every publish setting filled in.
pub fn complete_config() -> MarginaliaConfig {
    MarginaliaConfig {
        token: Some("ghp_example".to_owned()),
        username: Some("comment-bot".to_owned()),
        source_owner: Some("comment-bot".to_owned()),
        source_repo: Some("blog".to_owned()),
        destination_owner: Some("octocat".to_owned()),
        destination_repo: Some("blog".to_owned()),
        ..MarginaliaConfig::default()
    }
}
