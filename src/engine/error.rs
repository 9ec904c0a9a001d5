//! Error types for engine construction and invocation.

use std::time::Duration;

use thiserror::Error;

use crate::scheduler::ScheduleError;

/// Error type for building an engine.
///
/// Construction is the only place configuration is checked; a built
/// engine never reports configuration problems at invocation time.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The delay is shorter than one millisecond.
    #[error("Invalid delay {delay:?}: must be at least 1ms")]
    InvalidDelay {
        /// The rejected delay
        delay: Duration,
    },

    /// A keyed engine was built without a usable key class.
    #[error("Invalid key class '{class}': keyed engines need a non-blank class")]
    InvalidKeyClass {
        /// The rejected class name
        class: String,
    },

    /// No scheduler was given and none could be bound to the current runtime.
    #[error("No scheduler available: {0}")]
    Scheduler(#[from] ScheduleError),
}

/// Error type for debounce invocations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine was shut down and accepts no new work.
    #[error("Engine '{engine}' has been shut down")]
    ShutDown {
        /// Label of the engine
        engine: String,
    },

    /// The scheduler refused the delayed run.
    #[error("Failed to schedule: {0}")]
    Schedule(#[from] ScheduleError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn invalid_delay_displays_value() {
        let error = BuildError::InvalidDelay {
            delay: Duration::ZERO,
        };
        assert!(error.to_string().contains("0ns"));
        assert!(error.to_string().contains("at least 1ms"));
    }

    #[test]
    fn invalid_key_class_displays_name() {
        let error = BuildError::InvalidKeyClass {
            class: " ".to_string(),
        };
        assert!(error.to_string().contains("non-blank"));
    }

    #[test]
    fn scheduler_error_converts_and_keeps_source() {
        let error: BuildError = ScheduleError::NoRuntime.into();

        assert!(matches!(error, BuildError::Scheduler(_)));
        assert!(error.source().is_some());
    }

    #[test]
    fn shut_down_names_engine() {
        let error = EngineError::ShutDown {
            engine: "chat".to_string(),
        };
        assert_eq!(error.to_string(), "Engine 'chat' has been shut down");
    }

    #[test]
    fn schedule_error_converts() {
        let error: EngineError = ScheduleError::Shutdown.into();
        assert!(matches!(error, EngineError::Schedule(ScheduleError::Shutdown)));
    }
}
