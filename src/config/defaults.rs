//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default engine delay in milliseconds.
pub const DELAY_MS: u64 = 500;

/// Whether engines are shut down by the directory unless told otherwise.
pub const AUTO_SHUTDOWN: bool = true;

/// Output path of the `init` subcommand.
pub const CONFIG_FILE: &str = "keyed-gate.toml";

/// Default engine delay as Duration.
#[must_use]
pub const fn delay() -> Duration {
    Duration::from_millis(DELAY_MS)
}
