//! Configuration layer for the keyed-gate scenario runner.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML scenario file parsing ([`TomlConfig`])
//! - Validated scenario ([`ValidatedConfig`], [`EngineSpec`], [`Step`])
//! - Scenario template generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - `--default-delay`
//! 2. **Scenario file** - the `[defaults]` section, then per-engine fields
//! 3. **Built-in defaults** - 500ms delay, `auto_shutdown = true`
//!
//! A per-engine `delay_ms` always wins over any default, including the
//! CLI one.
//!
//! # Boolean Flag Semantics
//!
//! `--shutdown-all` and `defaults.shutdown_all` use OR semantics: if either
//! is set, the final shutdown reaches every engine.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod toml_tests;
#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{EngineSpec, Step, StepAction, ValidatedConfig, write_default_config};
