//! Tokio-backed scheduler.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::time::Instant;

use super::{Job, ScheduleError, Scheduler, TimerHandle};

/// Scheduler that runs each job in a Tokio task after a `sleep`.
///
/// Two flavors exist:
///
/// - **Shared** ([`TokioScheduler::new`], [`TokioScheduler::current`]):
///   borrows an existing runtime. It owns nothing, so
///   [`shutdown`](Scheduler::shutdown) is a no-op and the scheduler keeps
///   accepting work.
/// - **Dedicated** ([`TokioScheduler::dedicated`]): owns a one-worker
///   runtime. Shutdown stops that runtime, cancels every pending timer,
///   and rejects further scheduling.
///
/// # Example
///
/// ```
/// use keyed_gate::scheduler::{Scheduler, TimerHandle, TokioScheduler};
/// use std::time::Duration;
///
/// let scheduler = TokioScheduler::dedicated("doc-timer").unwrap();
/// let timer = TimerHandle::new();
/// scheduler
///     .schedule(Duration::from_millis(10), &timer, Box::new(|| {}))
///     .unwrap();
/// scheduler.shutdown();
/// assert!(scheduler.is_shutdown());
/// ```
pub struct TokioScheduler {
    handle: Handle,
    owned: Mutex<Option<Runtime>>,
    dedicated: bool,
    closed: AtomicBool,
}

impl TokioScheduler {
    /// Creates a shared scheduler on the given runtime handle.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self {
            handle,
            owned: Mutex::new(None),
            dedicated: false,
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a shared scheduler on the runtime of the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoRuntime`] when called outside a runtime.
    pub fn current() -> Result<Self, ScheduleError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| ScheduleError::NoRuntime)
    }

    /// Creates a scheduler that owns a single-worker runtime.
    ///
    /// `name` is used for the worker thread name.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RuntimeStart`] if the runtime cannot start.
    pub fn dedicated(name: &str) -> Result<Self, ScheduleError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(name)
            .enable_time()
            .build()
            .map_err(ScheduleError::RuntimeStart)?;

        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Mutex::new(Some(runtime)),
            dedicated: true,
            closed: AtomicBool::new(false),
        })
    }

    /// Returns `true` if this scheduler owns its runtime.
    #[must_use]
    pub const fn is_dedicated(&self) -> bool {
        self.dedicated
    }

    fn release_runtime(&self) {
        let runtime = self
            .owned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        // `shutdown_background` never blocks, so this is safe from async code.
        if let Some(runtime) = runtime {
            runtime.shutdown_background();
        }
    }
}

/// Cancels its timer when the task is dropped before firing, as happens
/// when the owning runtime stops. A timer that already fired is untouched.
struct CancelOnDrop(TimerHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, timer: &TimerHandle, job: Job) -> Result<(), ScheduleError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ScheduleError::Shutdown);
        }

        if !timer.is_armed() {
            return Ok(());
        }

        // Measured from the call, not from when the task is first polled.
        let deadline = Instant::now() + delay;
        let guard = CancelOnDrop(timer.clone());
        let task = self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if guard.0.try_fire() {
                job();
            }
        });
        timer.attach(task.abort_handle());

        Ok(())
    }

    fn shutdown(&self) {
        if !self.dedicated {
            return;
        }

        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Stopping dedicated scheduler runtime");
            self.release_runtime();
        }
    }

    fn is_shutdown(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.release_runtime();
    }
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("dedicated", &self.dedicated)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
