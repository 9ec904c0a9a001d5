//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Missing required field that must be provided by CLI or config file.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing field
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// An engine delay is zero.
    #[error("Invalid delay for engine '{engine}': must be at least 1ms")]
    InvalidDelay {
        /// Name of the engine, or `defaults` for the default delay
        engine: String,
    },

    /// A keyed engine has a blank key class.
    #[error("Invalid key class for engine '{engine}': must not be blank")]
    InvalidKeyClass {
        /// Name of the engine
        engine: String,
    },

    /// Two engines share a name.
    #[error("Duplicate engine name '{name}'")]
    DuplicateEngine {
        /// The repeated name
        name: String,
    },

    /// A step refers to an engine that is not defined.
    #[error("Step {step} refers to unknown engine '{name}'")]
    UnknownEngine {
        /// Zero-based index of the step in the file
        step: usize,
        /// The unknown name
        name: String,
    },

    /// A step is malformed.
    #[error("Invalid step {step}: {reason}")]
    InvalidStep {
        /// Zero-based index of the step in the file
        step: usize,
        /// Reason for invalidity
        reason: String,
    },
}

/// Well-known field names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The scenario file path.
    pub const CONFIG: &str = "config";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required field.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }

    pub(crate) fn invalid_step(step: usize, reason: impl Into<String>) -> Self {
        Self::InvalidStep {
            step,
            reason: reason.into(),
        }
    }
}
