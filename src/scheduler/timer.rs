//! Fire-once timer handles.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::AbortHandle;

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Observable state of a [`TimerHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Waiting to fire.
    Armed,
    /// The job was released to run.
    Fired,
    /// Cancelled before it could fire.
    Cancelled,
}

/// Shared handle to a single delayed run.
///
/// A handle moves from `Armed` to exactly one of `Fired` or `Cancelled`.
/// Both transitions are a single compare-and-swap on the same state word,
/// so a cancel racing with the timer expiring has exactly one winner:
/// either the job runs and the cancel reports `false`, or the cancel wins
/// and the job never runs.
///
/// Clones refer to the same timer.
#[derive(Clone)]
pub struct TimerHandle {
    inner: Arc<TimerState>,
}

struct TimerState {
    id: u64,
    state: AtomicU8,
    task: Mutex<Option<AbortHandle>>,
}

impl TimerHandle {
    /// Creates a new armed timer that is not yet attached to any task.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TimerState {
                id: NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed),
                state: AtomicU8::new(ARMED),
                task: Mutex::new(None),
            }),
        }
    }

    /// Returns the process-unique identifier of this timer.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn status(&self) -> TimerStatus {
        match self.inner.state.load(Ordering::Acquire) {
            ARMED => TimerStatus::Armed,
            FIRED => TimerStatus::Fired,
            _ => TimerStatus::Cancelled,
        }
    }

    /// Returns `true` while the timer is still waiting to fire.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.status() == TimerStatus::Armed
    }

    /// Cancels the timer if it has not fired yet.
    ///
    /// Returns `true` if this call cancelled the timer, `false` if it had
    /// already fired or was already cancelled.
    pub fn cancel(&self) -> bool {
        let won = self
            .inner
            .state
            .compare_exchange(ARMED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if won {
            if let Some(task) = self.task_slot().take() {
                task.abort();
            }
        }

        won
    }

    /// Claims the right to run the job.
    ///
    /// Called by schedulers when the delay elapses. Returns `true` exactly
    /// once per timer, and never after [`cancel`](Self::cancel) succeeded.
    pub fn try_fire(&self) -> bool {
        self.inner
            .state
            .compare_exchange(ARMED, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Attaches the task driving this timer so cancellation can abort it.
    ///
    /// If the timer was cancelled before the task existed, the task is
    /// aborted immediately.
    pub(crate) fn attach(&self, task: AbortHandle) {
        let mut slot = self.task_slot();
        match self.inner.state.load(Ordering::Acquire) {
            CANCELLED => task.abort(),
            ARMED => *slot = Some(task),
            _ => {}
        }
    }

    fn task_slot(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
        self.inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TimerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for TimerHandle {}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.inner.id)
            .field("status", &self.status())
            .finish()
    }
}
