//! Scenario replay.
//!
//! This module builds the engines a scenario describes, replays its steps
//! on the tokio clock, and collects what fired into a [`Summary`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::signal;
use tokio::time::Instant;

use keyed_gate::config::{EngineSpec, Step, StepAction, ValidatedConfig};
use keyed_gate::debounce::{self, DebounceBuilder};
use keyed_gate::directory::{Directory, Eviction, ShutdownReport};
use keyed_gate::engine::{BuildError, EngineError, EngineKind, KeyShape};
use keyed_gate::throttle::{self, ThrottleBuilder};
use keyed_gate::time::Clock;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Extra wait after the longest delay so runs due at the very end fire
/// before the directory shuts down.
const SETTLE_GRACE: Duration = Duration::from_millis(10);

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// An engine could not be built.
    #[error("Failed to build engine '{name}': {source}")]
    Build {
        /// Engine name from the scenario
        name: String,
        /// Underlying build error
        #[source]
        source: BuildError,
    },

    /// A debounce trigger was refused.
    #[error("Step at {}ms failed on engine '{name}': {source}", at.as_millis())]
    Invoke {
        /// Engine name from the scenario
        name: String,
        /// Step time
        at: Duration,
        /// Underlying engine error
        #[source]
        source: EngineError,
    },

    /// The summary could not be rendered as JSON.
    #[error("Failed to render summary: {0}")]
    Render(#[from] serde_json::Error),
}

/// One action execution observed during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Firing {
    /// Milliseconds since the start of the replay
    pub at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

/// Per-engine outcome.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    pub name: String,
    pub kind: EngineKind,
    pub shape: KeyShape,
    pub key_class: String,
    /// Steps that targeted this engine
    pub triggers: usize,
    /// Throttle calls dropped inside the window
    pub rejected: usize,
    pub firings: Vec<Firing>,
}

/// Outcome of a whole replay.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub engines: Vec<EngineSummary>,
    /// Per-key entries removed by eviction steps
    pub evicted: usize,
    pub shutdown: ShutdownReport,
    pub elapsed_ms: u64,
}

impl Summary {
    /// Looks up an engine by name.
    #[must_use]
    pub fn engine(&self, name: &str) -> Option<&EngineSummary> {
        self.engines.iter().find(|e| e.name == name)
    }
}

/// Shared sink the engine actions write into.
type Recorder = Arc<Mutex<Vec<Firing>>>;

/// Throttle clock driven by the tokio timer, so throttles and debounces
/// share one notion of time, paused or not.
#[derive(Debug, Clone, Copy)]
struct ReplayClock {
    start: Instant,
}

impl Clock for ReplayClock {
    fn now_millis(&self) -> u64 {
        millis_since(self.start)
    }
}

/// A built engine, typed by kind and shape.
enum Gate {
    DebounceSingleton(debounce::Singleton),
    DebounceSimple(debounce::Simple<String>),
    DebounceParameterized(debounce::Parameterized<String, String>),
    ThrottleSingleton(throttle::Singleton),
    ThrottleSimple(throttle::Simple<String>),
    ThrottleParameterized(throttle::Parameterized<String, String>),
}

/// One engine with its bookkeeping.
struct Lane<'a> {
    spec: &'a EngineSpec,
    gate: Gate,
    recorder: Recorder,
    triggers: usize,
    rejected: usize,
}

/// Executes the scenario until it completes or a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if an engine cannot be built, a trigger is refused,
/// or the summary cannot be rendered.
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires
/// OS signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tokio::select! {
        biased;

        () = &mut shutdown => {
            tracing::info!("Shutdown signal received, stopping...");
            Ok(())
        }

        summary = replay(&config) => {
            let summary = summary?;
            println!("{}", render(&summary, config.json)?);
            Ok(())
        }
    }
}

/// Builds the engines and replays every step.
///
/// After the last step the replay waits for the longest engine delay so
/// pending debounced runs fire, then shuts the directory down.
///
/// # Errors
///
/// Returns an error if an engine cannot be built or a debounce trigger is
/// refused.
pub async fn replay(config: &ValidatedConfig) -> Result<Summary, RunError> {
    let directory = Directory::with_policy(config.policy);
    let start = Instant::now();

    let mut lanes = config
        .engines
        .iter()
        .map(|spec| build_lane(&directory, spec, start))
        .collect::<Result<Vec<_>, _>>()?;

    let mut evicted = 0;
    for step in &config.steps {
        tokio::time::sleep_until(start + step.at).await;
        evicted += apply_step(&directory, &mut lanes, step)?;
    }

    tokio::time::sleep_until(start + config.span() + config.max_delay() + SETTLE_GRACE).await;
    let shutdown = directory.shutdown_all();

    Ok(Summary {
        engines: lanes.into_iter().map(Lane::into_summary).collect(),
        evicted,
        shutdown,
        elapsed_ms: millis_since(start),
    })
}

/// Renders the summary as text or pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(summary: &Summary, json: bool) -> Result<String, RunError> {
    if json {
        return Ok(serde_json::to_string_pretty(summary)?);
    }

    let mut out = format!(
        "{:<20} {:<9} {:<14} {:>8} {:>6} {:>8}\n",
        "ENGINE", "KIND", "SHAPE", "TRIGGERS", "FIRED", "REJECTED"
    );
    for engine in &summary.engines {
        out.push_str(&format!(
            "{:<20} {:<9} {:<14} {:>8} {:>6} {:>8}\n",
            engine.name,
            engine.kind.to_string(),
            engine.shape.to_string(),
            engine.triggers,
            engine.firings.len(),
            engine.rejected,
        ));
    }
    out.push_str(&format!(
        "evicted: {}, shut down: {}, left running: {}, elapsed: {}ms",
        summary.evicted, summary.shutdown.shut_down, summary.shutdown.skipped, summary.elapsed_ms
    ));

    Ok(out)
}

fn build_lane<'a>(
    directory: &Directory,
    spec: &'a EngineSpec,
    start: Instant,
) -> Result<Lane<'a>, RunError> {
    let recorder: Recorder = Arc::default();
    let gate = build_gate(directory, spec, &recorder, start).map_err(|source| RunError::Build {
        name: spec.name.clone(),
        source,
    })?;

    tracing::debug!(engine = %spec.name, kind = %spec.kind, shape = %spec.shape, "Built engine");
    Ok(Lane {
        spec,
        gate,
        recorder,
        triggers: 0,
        rejected: 0,
    })
}

fn build_gate(
    directory: &Directory,
    spec: &EngineSpec,
    recorder: &Recorder,
    start: Instant,
) -> Result<Gate, BuildError> {
    let record = firing_sink(&spec.name, recorder, start);

    let gate = match spec.kind {
        EngineKind::Debounce => {
            let builder = DebounceBuilder::new(spec.delay)
                .key_class(spec.key_class.clone())
                .label(spec.name.clone())
                .auto_shutdown(spec.auto_shutdown);
            match spec.shape {
                KeyShape::Singleton => {
                    Gate::DebounceSingleton(builder.singleton(directory, move || record(None, None))?)
                }
                KeyShape::Simple => Gate::DebounceSimple(
                    builder.simple(directory, move |key| record(Some(key), None))?,
                ),
                KeyShape::Parameterized => Gate::DebounceParameterized(
                    builder.parameterized(directory, move |key, param| {
                        record(Some(key), Some(param));
                    })?,
                ),
            }
        }
        EngineKind::Throttle => {
            let builder = ThrottleBuilder::new(spec.delay)
                .clock(Arc::new(ReplayClock { start }))
                .key_class(spec.key_class.clone())
                .label(spec.name.clone())
                .auto_shutdown(spec.auto_shutdown);
            match spec.shape {
                KeyShape::Singleton => {
                    Gate::ThrottleSingleton(builder.singleton(directory, move || record(None, None))?)
                }
                KeyShape::Simple => Gate::ThrottleSimple(
                    builder.simple(directory, move |key| record(Some(key), None))?,
                ),
                KeyShape::Parameterized => Gate::ThrottleParameterized(
                    builder.parameterized(directory, move |key, param| {
                        record(Some(key), Some(param));
                    })?,
                ),
            }
        }
    };

    Ok(gate)
}

/// Returns the callback every engine action funnels into.
fn firing_sink(
    name: &str,
    recorder: &Recorder,
    start: Instant,
) -> impl Fn(Option<String>, Option<String>) + Send + Sync + Clone + 'static {
    let name = name.to_string();
    let recorder = Arc::clone(recorder);
    move |key, param| {
        let at_ms = millis_since(start);
        tracing::info!(engine = %name, ?key, ?param, at_ms, "Fired");
        recorder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Firing { at_ms, key, param });
    }
}

fn apply_step(
    directory: &Directory,
    lanes: &mut [Lane<'_>],
    step: &Step,
) -> Result<usize, RunError> {
    match &step.action {
        StepAction::Invoke { engine, key, param } => {
            // Validation guarantees the engine exists.
            if let Some(lane) = lanes.iter_mut().find(|lane| lane.spec.name == *engine) {
                lane.trigger(key.clone(), param.clone(), step.at)?;
            }
            Ok(0)
        }
        StepAction::Evict {
            key_class,
            key,
            aliases,
        } => {
            let eviction = aliases.iter().fold(
                Eviction::new(key_class.clone(), key.clone()),
                |eviction, (class, alias)| eviction.alias(class.clone(), alias.clone()),
            );
            let removed = directory.evict(&eviction);
            tracing::info!(key_class = %key_class, %key, removed, "Evicted");
            Ok(removed)
        }
    }
}

impl Lane<'_> {
    /// Feeds one step to the engine. Shape mismatches cannot occur after
    /// validation; a missing key or param falls back to an empty string.
    fn trigger(
        &mut self,
        key: Option<String>,
        param: Option<String>,
        at: Duration,
    ) -> Result<(), RunError> {
        self.triggers += 1;
        let key = key.unwrap_or_default();
        let param = param.unwrap_or_default();

        // Debounce triggers are always accepted; only throttles reject.
        let admitted = match &self.gate {
            Gate::DebounceSingleton(gate) => gate.invoke().map(|()| true),
            Gate::DebounceSimple(gate) => gate.invoke(key).map(|()| true),
            Gate::DebounceParameterized(gate) => gate.invoke(key, param).map(|()| true),
            Gate::ThrottleSingleton(gate) => Ok(gate.invoke()),
            Gate::ThrottleSimple(gate) => Ok(gate.invoke(key)),
            Gate::ThrottleParameterized(gate) => Ok(gate.invoke(key, param)),
        }
        .map_err(|source| RunError::Invoke {
            name: self.spec.name.clone(),
            at,
            source,
        })?;

        if !admitted {
            self.rejected += 1;
            tracing::debug!(engine = %self.spec.name, "Throttled");
        }
        Ok(())
    }

    fn into_summary(self) -> EngineSummary {
        let firings = std::mem::take(
            &mut *self
                .recorder
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        EngineSummary {
            name: self.spec.name.clone(),
            kind: self.spec.kind,
            shape: self.spec.shape,
            key_class: self.spec.key_class.to_string(),
            triggers: self.triggers,
            rejected: self.rejected,
            firings,
        }
    }
}

fn millis_since(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
