//! `keyed-gate`: replays a scripted scenario of triggers and evictions
//! against debounce and throttle engines and prints what fired.
//!
//! ```text
//! keyed-gate init --output gates.toml
//! keyed-gate --config gates.toml --json
//! ```

use std::path::Path;
use std::process::ExitCode;

use keyed_gate::config::{Cli, Command, ValidatedConfig, write_default_config};

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Some(Command::Init { output }) = &cli.command {
        return write_template(output);
    }

    let scenario = match ValidatedConfig::load(&cli) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Scenario rejected: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(scenario.verbose);
    tracing::info!("Loaded {scenario}");

    replay_scenario(scenario)
}

/// `keyed-gate init`: writes the example scenario to `output`.
fn write_template(output: &Path) -> ExitCode {
    if let Err(e) = write_default_config(output) {
        eprintln!("Error: {e}");
        return exit_code::CONFIG_ERROR;
    }

    println!("Example scenario written to {}", output.display());
    println!("Replay it with: keyed-gate --config {}", output.display());
    exit_code::SUCCESS
}

/// Replays on a multi-thread runtime so debounce timers and throttle
/// callers run concurrently, as they would in a host process.
#[cfg(not(tarpaulin_include))]
fn replay_scenario(scenario: ValidatedConfig) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Cannot start the replay runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    if let Err(e) = runtime.block_on(run::execute(scenario)) {
        tracing::error!("Replay failed: {e}");
        return exit_code::runtime_error();
    }
    exit_code::SUCCESS
}
