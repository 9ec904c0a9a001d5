//! Validated scenario after merging CLI and TOML sources.
//!
//! This module contains the final, validated scenario that is replayed by
//! the runner. All validation is performed during construction.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::directory::ShutdownPolicy;
use crate::engine::{EngineKind, KeyClass, KeyShape};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::{EngineSection, StepSection, TomlConfig};

/// Fully validated scenario ready for replay.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and a parsed
/// scenario file, or [`ValidatedConfig::load`] to read the file named by
/// `--config`.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Engines in definition order, debounces first
    pub engines: Vec<EngineSpec>,

    /// Steps sorted by time; steps sharing a time keep file order
    pub steps: Vec<Step>,

    /// Which engines the final shutdown reaches
    pub policy: ShutdownPolicy,

    /// Print the summary as JSON
    pub json: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

/// One engine to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSpec {
    pub name: String,
    pub kind: EngineKind,
    pub shape: KeyShape,
    pub key_class: KeyClass,
    pub delay: Duration,
    pub auto_shutdown: bool,
}

/// One timeline entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Offset from the start of the replay
    pub at: Duration,
    pub action: StepAction,
}

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Trigger an engine. `key` is `None` for singletons, `param` is set
    /// only for parameterized engines.
    Invoke {
        engine: String,
        key: Option<String>,
        param: Option<String>,
    },
    /// Evict a key, and its aliases, through the directory.
    Evict {
        key_class: KeyClass,
        key: String,
        aliases: Vec<(KeyClass, String)>,
    },
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let debounces = self
            .engines
            .iter()
            .filter(|e| e.kind == EngineKind::Debounce)
            .count();

        write!(
            f,
            "Scenario {{ debounce: {}, throttle: {}, steps: {}, span: {}ms, policy: {:?} }}",
            debounces,
            self.engines.len() - debounces,
            self.steps.len(),
            self.span().as_millis(),
            self.policy,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated scenario from CLI arguments and a parsed file.
    ///
    /// CLI arguments take precedence over values in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A delay resolves to zero
    /// - A keyed engine has a blank key class
    /// - Two engines share a name
    /// - A step names an unknown engine or is malformed
    pub fn from_raw(cli: &Cli, toml: &TomlConfig) -> Result<Self, ConfigError> {
        let default_delay = Self::resolve_default_delay(cli, toml)?;
        let default_auto_shutdown = toml
            .defaults
            .auto_shutdown
            .unwrap_or(defaults::AUTO_SHUTDOWN);

        let engines = Self::build_engines(toml, default_delay, default_auto_shutdown)?;
        let steps = Self::build_steps(&toml.steps, &engines)?;

        // Flags only enable: either source may request the wider policy.
        let policy = if cli.shutdown_all || toml.defaults.shutdown_all {
            ShutdownPolicy::All
        } else {
            ShutdownPolicy::AutoOnly
        };

        Ok(Self {
            engines,
            steps,
            policy,
            json: cli.json,
            verbose: cli.verbose,
        })
    }

    /// Loads the file named by `cli.config` and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No scenario file was given
    /// - The file cannot be read or parsed
    /// - The scenario is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let path = cli.config.as_deref().ok_or_else(|| {
            ConfigError::missing(field::CONFIG, "Use --config to name a scenario file")
        })?;

        let toml = TomlConfig::load(path)?;
        Self::from_raw(cli, &toml)
    }

    /// Looks up an engine by name.
    #[must_use]
    pub fn engine(&self, name: &str) -> Option<&EngineSpec> {
        self.engines.iter().find(|e| e.name == name)
    }

    /// Time of the last step.
    #[must_use]
    pub fn span(&self) -> Duration {
        self.steps.last().map_or(Duration::ZERO, |s| s.at)
    }

    /// Longest engine delay.
    #[must_use]
    pub fn max_delay(&self) -> Duration {
        self.engines
            .iter()
            .map(|e| e.delay)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    fn resolve_default_delay(cli: &Cli, toml: &TomlConfig) -> Result<u64, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let millis = cli
            .default_delay
            .or(toml.defaults.delay_ms)
            .unwrap_or(defaults::DELAY_MS);

        if millis == 0 {
            return Err(ConfigError::InvalidDelay {
                engine: "defaults".to_string(),
            });
        }

        Ok(millis)
    }

    fn build_engines(
        toml: &TomlConfig,
        default_delay: u64,
        default_auto_shutdown: bool,
    ) -> Result<Vec<EngineSpec>, ConfigError> {
        let sections = toml
            .debounce
            .iter()
            .map(|s| (EngineKind::Debounce, s))
            .chain(toml.throttle.iter().map(|s| (EngineKind::Throttle, s)));

        let mut engines: Vec<EngineSpec> = Vec::new();
        for (kind, section) in sections {
            if engines.iter().any(|e| e.name == section.name) {
                return Err(ConfigError::DuplicateEngine {
                    name: section.name.clone(),
                });
            }
            engines.push(build_engine(
                kind,
                section,
                default_delay,
                default_auto_shutdown,
            )?);
        }

        Ok(engines)
    }

    fn build_steps(
        sections: &[StepSection],
        engines: &[EngineSpec],
    ) -> Result<Vec<Step>, ConfigError> {
        let shapes: HashMap<&str, KeyShape> = engines
            .iter()
            .map(|e| (e.name.as_str(), e.shape))
            .collect();

        let mut steps = sections
            .iter()
            .enumerate()
            .map(|(index, section)| build_step(index, section, &shapes))
            .collect::<Result<Vec<_>, _>>()?;

        // Stable: equal times keep file order.
        steps.sort_by_key(|s| s.at);
        Ok(steps)
    }
}

/// Writes the scenario template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn build_engine(
    kind: EngineKind,
    section: &EngineSection,
    default_delay: u64,
    default_auto_shutdown: bool,
) -> Result<EngineSpec, ConfigError> {
    let delay_ms = section.delay_ms.unwrap_or(default_delay);
    if delay_ms == 0 {
        return Err(ConfigError::InvalidDelay {
            engine: section.name.clone(),
        });
    }

    let (shape, key_class) = match section.key_class.as_deref() {
        None => (KeyShape::Singleton, KeyClass::UNIT),
        Some(class) if class.trim().is_empty() => {
            return Err(ConfigError::InvalidKeyClass {
                engine: section.name.clone(),
            });
        }
        Some(class) if section.parameterized => {
            (KeyShape::Parameterized, KeyClass::new(class))
        }
        Some(class) => (KeyShape::Simple, KeyClass::new(class)),
    };

    Ok(EngineSpec {
        name: section.name.clone(),
        kind,
        shape,
        key_class,
        delay: Duration::from_millis(delay_ms),
        auto_shutdown: section.auto_shutdown.unwrap_or(default_auto_shutdown),
    })
}

fn build_step(
    index: usize,
    section: &StepSection,
    shapes: &HashMap<&str, KeyShape>,
) -> Result<Step, ConfigError> {
    let at = Duration::from_millis(section.at_ms);

    let action = match (&section.engine, &section.evict) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::invalid_step(
                index,
                "set either `engine` or `evict`, not both",
            ));
        }
        (None, None) => {
            return Err(ConfigError::invalid_step(
                index,
                "one of `engine` or `evict` is required",
            ));
        }
        (Some(engine), None) => invoke_action(index, engine, section, shapes)?,
        (None, Some(class)) => evict_action(index, class, section)?,
    };

    Ok(Step { at, action })
}

fn invoke_action(
    index: usize,
    engine: &str,
    section: &StepSection,
    shapes: &HashMap<&str, KeyShape>,
) -> Result<StepAction, ConfigError> {
    let shape = *shapes.get(engine).ok_or_else(|| ConfigError::UnknownEngine {
        step: index,
        name: engine.to_string(),
    })?;

    if !section.aliases.is_empty() {
        return Err(ConfigError::invalid_step(
            index,
            "`aliases` only apply to evictions",
        ));
    }

    match (shape, &section.key, &section.param) {
        (KeyShape::Singleton, Some(_), _) => Err(ConfigError::invalid_step(
            index,
            format!("engine '{engine}' is a singleton and takes no `key`"),
        )),
        (KeyShape::Simple | KeyShape::Parameterized, None, _) => Err(ConfigError::invalid_step(
            index,
            format!("engine '{engine}' needs a `key`"),
        )),
        (KeyShape::Parameterized, Some(_), None) => Err(ConfigError::invalid_step(
            index,
            format!("engine '{engine}' is parameterized and needs a `param`"),
        )),
        (KeyShape::Singleton | KeyShape::Simple, _, Some(_)) => Err(ConfigError::invalid_step(
            index,
            format!("engine '{engine}' is not parameterized and takes no `param`"),
        )),
        _ => Ok(StepAction::Invoke {
            engine: engine.to_string(),
            key: section.key.clone(),
            param: section.param.clone(),
        }),
    }
}

fn evict_action(
    index: usize,
    class: &str,
    section: &StepSection,
) -> Result<StepAction, ConfigError> {
    if class.trim().is_empty() {
        return Err(ConfigError::invalid_step(index, "`evict` must name a key class"));
    }
    let Some(key) = section.key.clone() else {
        return Err(ConfigError::invalid_step(index, "an eviction needs a `key`"));
    };
    if section.param.is_some() {
        return Err(ConfigError::invalid_step(
            index,
            "`param` only applies to triggers",
        ));
    }

    let aliases = section
        .aliases
        .iter()
        .map(|alias| (KeyClass::new(alias.key_class.clone()), alias.key.clone()))
        .collect();

    Ok(StepAction::Evict {
        key_class: KeyClass::new(class),
        key,
        aliases,
    })
}
