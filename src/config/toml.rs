//! TOML scenario file parsing.
//!
//! Defines the structure of the scenario file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root structure of a scenario file.
///
/// Engine fields are optional where a default exists so that short
/// scenarios stay short.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Values applied to engines that leave them unset
    #[serde(default)]
    pub defaults: DefaultsSection,

    /// Debounce engine definitions
    #[serde(default)]
    pub debounce: Vec<EngineSection>,

    /// Throttle engine definitions
    #[serde(default)]
    pub throttle: Vec<EngineSection>,

    /// Timeline entries, replayed in `at_ms` order
    #[serde(default, rename = "step")]
    pub steps: Vec<StepSection>,
}

/// Scenario-wide defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    /// Engine delay in milliseconds
    pub delay_ms: Option<u64>,

    /// Engine `auto_shutdown` flag
    pub auto_shutdown: Option<bool>,

    /// Shut down every engine at the end regardless of its flag
    #[serde(default)]
    pub shutdown_all: bool,
}

/// One engine definition.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Name used by steps and in the summary
    pub name: String,

    /// Delay in milliseconds
    pub delay_ms: Option<u64>,

    /// Key class; omit for a singleton engine
    pub key_class: Option<String>,

    /// Whether the directory shuts this engine down
    pub auto_shutdown: Option<bool>,

    /// Whether steps carry a `param` value
    #[serde(default)]
    pub parameterized: bool,
}

/// One timeline entry.
///
/// Either `engine` (a trigger) or `evict` (an eviction) must be set.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSection {
    /// Offset from the start of the replay in milliseconds
    pub at_ms: u64,

    /// Engine to trigger
    pub engine: Option<String>,

    /// Key class to evict from
    pub evict: Option<String>,

    /// Key value
    pub key: Option<String>,

    /// Value passed to a parameterized engine
    pub param: Option<String>,

    /// Other representations of the evicted key
    #[serde(default)]
    pub aliases: Vec<AliasSection>,
}

/// Alias of an evicted key in another key class.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasSection {
    /// Class the alias belongs to
    pub key_class: String,

    /// Alias key value
    pub key: String,
}

impl TomlConfig {
    /// Loads a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a commented scenario template.
#[must_use]
pub fn default_config_template() -> String {
    r#"# keyed-gate scenario file
#
# Engines are built first, then steps are replayed in `at_ms` order.
# After the last step the runner waits one maximum delay, shuts the
# directory down, and prints what fired.

[defaults]
# Delay in milliseconds for engines without `delay_ms` (default: 500)
delay_ms = 500

# Whether engines are shut down at the end (default: true)
# auto_shutdown = true

# Shut down every engine, ignoring `auto_shutdown = false`
# shutdown_all = false

[[debounce]]
name = "save-player"
key_class = "player"
delay_ms = 200

[[throttle]]
name = "chat-cooldown"
key_class = "player"
delay_ms = 1000
parameterized = true

# A singleton engine: no key_class
# [[debounce]]
# name = "flush"

[[step]]
at_ms = 0
engine = "save-player"
key = "alice"

[[step]]
at_ms = 100
engine = "save-player"
key = "alice"

[[step]]
at_ms = 0
engine = "chat-cooldown"
key = "alice"
param = "hello"

[[step]]
at_ms = 300
engine = "chat-cooldown"
key = "alice"
param = "spam"

# Evict a key from every engine of a class
# [[step]]
# at_ms = 400
# evict = "player"
# key = "alice"
# aliases = [{ key_class = "proxy-player", key = "proxy:alice" }]
"#
    .to_string()
}
