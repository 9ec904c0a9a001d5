//! Delayed-execution layer used by the debounce engine.
//!
//! This module provides:
//! - Fire-once timer handles with race-free cancellation ([`TimerHandle`])
//! - The scheduling abstraction ([`Scheduler`], [`Job`])
//! - A Tokio-backed implementation, shared or dedicated ([`TokioScheduler`])
//! - Error handling ([`ScheduleError`])

mod error;
mod runtime;
mod timer;


pub use error::ScheduleError;
pub use runtime::TokioScheduler;
pub use timer::{TimerHandle, TimerStatus};

use std::fmt;
use std::time::Duration;

/// A unit of work run once when its timer fires.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction over a facility that runs a job after a delay.
///
/// The scheduler arms `timer` and runs `job` once `delay` has elapsed,
/// but only if [`TimerHandle::try_fire`] succeeds at that moment. A timer
/// cancelled before it fires therefore never runs its job, and cancelling
/// a timer that already fired is a no-op.
///
/// Jobs may run on a worker thread owned by the scheduler, decoupled from
/// the thread that called [`schedule`](Scheduler::schedule). A panicking
/// job is handled by the scheduler's own failure policy.
pub trait Scheduler: Send + Sync + fmt::Debug {
    /// Arms `timer` so that `job` runs after `delay`.
    ///
    /// A timer that is already cancelled is accepted and simply never fires.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Shutdown`] if the scheduler no longer
    /// accepts work.
    fn schedule(&self, delay: Duration, timer: &TimerHandle, job: Job) -> Result<(), ScheduleError>;

    /// Releases resources owned by this scheduler.
    ///
    /// Schedulers that borrow an external runtime have nothing to release.
    fn shutdown(&self);

    /// Returns `true` once [`shutdown`](Scheduler::shutdown) has released
    /// resources and further scheduling is rejected.
    fn is_shutdown(&self) -> bool;
}
