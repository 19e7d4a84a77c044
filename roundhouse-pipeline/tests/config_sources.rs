// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use roundhouse_pipeline::config::PipelineConfig;

#[test]
fn toml_overrides_defaults() {
    let defaults = PipelineConfig {
        stages: 2,
        microbatches: 4,
        repeats: 1,
    };

    let config: PipelineConfig = Figment::from(Serialized::defaults(defaults))
        .merge(Toml::string("stages = 4\nmicrobatches = 8"))
        .extract()
        .unwrap();

    assert_eq!(
        config,
        PipelineConfig {
            stages: 4,
            microbatches: 8,
            repeats: 1,
        }
    );
    config.validate().unwrap();
}

#[test]
fn extracted_configs_are_still_validated() {
    let config: PipelineConfig = Figment::new()
        .merge(Toml::string("stages = 4\nmicrobatches = 6\nrepeats = 1"))
        .extract()
        .unwrap();
    assert!(config.validate().is_err());
}
