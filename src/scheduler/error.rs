//! Error types for the scheduling layer.

use thiserror::Error;

/// Error type for scheduler operations.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The scheduler was shut down and rejects new work.
    #[error("Scheduler has been shut down")]
    Shutdown,

    /// No Tokio runtime is running on the current thread.
    ///
    /// Shared schedulers bind to the ambient runtime; construct them from
    /// inside a runtime or pass a [`tokio::runtime::Handle`] explicitly.
    #[error("No Tokio runtime available on the current thread")]
    NoRuntime,

    /// The dedicated runtime could not be started.
    #[error("Failed to start dedicated scheduler runtime: {0}")]
    RuntimeStart(#[source] std::io::Error),
}
