//! Tests for the validated scenario.

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{StepAction, ValidatedConfig};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["keyed-gate"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

mod engine_tests;
mod precedence_tests;
mod step_tests;
