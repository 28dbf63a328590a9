//! Tests for configuration and output naming.

use super::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.entry_module, "Program");
    assert_eq!(config.output_name("Program"), "main.py");
    assert_eq!(config.output_name("FarmUtils"), "farm_utils.py");
    assert_eq!(config.output_name("helpers"), "helpers.py");
    assert!(config.out_dir.is_none());
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config: Config = toml::from_str("entry_module = \"Farm\"\nextension = \"txt\"\n").expect("valid toml");
    assert_eq!(config.entry_module, "Farm");
    assert_eq!(config.entry_output, "main");
    assert_eq!(config.output_name("Farm"), "main.txt");
    assert_eq!(config.output_name("Program"), "program.txt");
}

#[test]
fn test_empty_config_is_default() {
    let config: Config = toml::from_str("").expect("valid toml");
    assert_eq!(config, Config::default());
}

#[test]
fn test_out_dir_from_config() {
    let config: Config = toml::from_str("out_dir = \"build\"").expect("valid toml");
    assert_eq!(config.out_dir.as_deref(), Some(std::path::Path::new("build")));
}

#[test]
fn test_mistyped_key_is_rejected() {
    assert!(toml::from_str::<Config>("extension = 3").is_err());
}
