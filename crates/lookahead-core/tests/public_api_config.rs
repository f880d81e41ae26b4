use std::io::Write;

use lookahead_core::{ConfigError, PlannerConfig, PlannerKind};

#[test]
fn bundled_yaml_is_the_default_config() {
    let yaml = PlannerConfig::default_yaml();
    assert!(yaml.contains("algorithm: optimistic"));

    let config = PlannerConfig::from_default_yaml().expect("bundled yaml should parse");
    assert_eq!(config, PlannerConfig::default());
    assert_eq!(config.seed, None);
    assert!(!config.keep_subtree);
}

#[test]
fn config_loads_from_a_file() {
    let path = std::env::temp_dir().join(format!(
        "lookahead-planner-config-{}.yaml",
        std::process::id()
    ));
    {
        let mut file = std::fs::File::create(&path).expect("temp file should be writable");
        writeln!(file, "algorithm: random_search").expect("write");
        writeln!(file, "gamma: 0.8").expect("write");
        writeln!(file, "budget: 250").expect("write");
        writeln!(file, "keep_subtree: true").expect("write");
        writeln!(file, "seed: 99").expect("write");
    }

    let config = PlannerConfig::from_yaml_path(&path).expect("config file should parse");
    std::fs::remove_file(&path).expect("temp file should be removable");

    assert_eq!(config.algorithm, PlannerKind::RandomSearch);
    assert_eq!(config.gamma, 0.8);
    assert_eq!(config.budget, 250);
    assert!(config.keep_subtree);
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.exploration, 1.0);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = PlannerConfig::from_yaml_path("/nonexistent/lookahead/planner.yaml")
        .expect_err("missing file should fail");
    assert!(matches!(err, ConfigError::Io(_)));
    assert!(err.to_string().starts_with("failed to read config file"));
}

#[test]
fn invalid_values_are_rejected_with_a_message() {
    for yaml in [
        "gamma: -0.1\n",
        "budget: 0\n",
        "exploration: -1.0\n",
        "max_depth: 0\n",
    ] {
        let err = PlannerConfig::from_yaml_str(yaml).expect_err("value should be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)), "{yaml}");
        assert!(err.to_string().starts_with("invalid planner config"), "{yaml}");
    }
}
