//! Process-level glue for the scenario runner: exit codes, hints printed
//! after a rejected scenario file, and log setup.

use keyed_gate::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit codes of `keyed-gate`.
pub mod exit_code {
    use std::process::ExitCode;

    /// The scenario replayed to the end, or the replay was interrupted by
    /// Ctrl+C / SIGTERM, or `init` wrote its template.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// The scenario was rejected before any engine was built: bad flags,
    /// unreadable or malformed TOML, invalid engine or step definitions.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// The replay itself failed: an engine could not be built or refused a
    /// trigger, or the summary could not be rendered.
    ///
    /// A function because `ExitCode::from` is not `const`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

const INIT_HINT: &str = "Run 'keyed-gate init' to write an example scenario, then pass it with --config.";
const STEP_HINT: &str =
    "Each [[step]] sets either `engine` (a name from [[debounce]] or [[throttle]]) or `evict` (a key class).";
const DELAY_HINT: &str = "Delays are whole milliseconds; set delay_ms >= 1 on the engine or in [defaults].";
const NAME_HINT: &str = "Engine names are shared by [[debounce]] and [[throttle]] and must be unique.";

/// Returns the follow-up advice for a rejected scenario, if any.
pub fn config_hint(error: &ConfigError) -> Option<&'static str> {
    match error {
        ConfigError::MissingRequired { field: f, .. } if *f == field::CONFIG => Some(INIT_HINT),
        ConfigError::FileRead { .. } | ConfigError::TomlParse(_) => Some(INIT_HINT),
        ConfigError::UnknownEngine { .. } | ConfigError::InvalidStep { .. } => Some(STEP_HINT),
        ConfigError::InvalidDelay { .. } => Some(DELAY_HINT),
        ConfigError::DuplicateEngine { .. } => Some(NAME_HINT),
        _ => None,
    }
}

/// Prints [`config_hint`] to stderr after the error itself.
pub fn print_config_hint(error: &ConfigError) {
    if let Some(hint) = config_hint(error) {
        eprintln!("\n{hint}");
    }
}

/// Installs the stderr log subscriber.
///
/// Firings and evictions are logged at INFO; `--verbose` adds per-trigger
/// DEBUG lines. `RUST_LOG` overrides both.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // stdout is reserved for the summary so `--json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_config_suggests_init() {
        let error = ConfigError::missing(field::CONFIG, "pass --config <path>");
        assert_eq!(config_hint(&error), Some(INIT_HINT));
    }

    #[test]
    fn unreadable_file_suggests_init() {
        let error = ConfigError::FileRead {
            path: PathBuf::from("absent.toml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(config_hint(&error), Some(INIT_HINT));
    }

    #[test]
    fn step_errors_explain_step_shape() {
        let error = ConfigError::UnknownEngine {
            step: 2,
            name: "ghost".to_string(),
        };
        assert_eq!(config_hint(&error), Some(STEP_HINT));
    }

    #[test]
    fn duplicate_names_get_their_own_hint() {
        let error = ConfigError::DuplicateEngine {
            name: "save".to_string(),
        };
        assert_eq!(config_hint(&error), Some(NAME_HINT));
    }
}
