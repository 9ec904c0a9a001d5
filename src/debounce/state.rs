//! Keyed debounce state shared by all public variants.

use std::any::Any;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;

use crate::engine::{EngineError, EngineKind, KeyClass, KeyShape, ManagedEngine, Removal};
use crate::scheduler::{Job, Scheduler, TimerHandle};

/// Callback run when a debounced key fires.
pub(crate) type Action<K, T> = Arc<dyn Fn(K, T) + Send + Sync>;

/// Settings fixed at construction.
#[derive(Debug, Clone)]
pub(crate) struct CoreSettings {
    pub label: String,
    pub key_class: KeyClass,
    pub shape: KeyShape,
    pub delay: Duration,
    pub auto_shutdown: bool,
}

/// One slot per key holding the timer that is currently allowed to fire.
///
/// # Invariant
///
/// At most one armed timer is reachable from `slots` for a given key. A new
/// trigger installs its timer with a single map insert, which returns the
/// previous occupant; that occupant is then cancelled. Because cancelling
/// and firing are one compare-and-swap on the timer itself, the superseded
/// timer either already fired (the cancel is a no-op) or never will.
pub(crate) struct DebounceCore<K, T>
where
    K: Hash + Eq,
{
    settings: CoreSettings,
    scheduler: Arc<dyn Scheduler>,
    /// Whether `scheduler` was created for this engine alone.
    owns_scheduler: bool,
    slots: DashMap<K, TimerHandle>,
    action: Action<K, T>,
    closed: AtomicBool,
}

impl<K, T> DebounceCore<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    pub(crate) fn new(
        settings: CoreSettings,
        scheduler: Arc<dyn Scheduler>,
        owns_scheduler: bool,
        action: Action<K, T>,
    ) -> Self {
        Self {
            settings,
            scheduler,
            owns_scheduler,
            slots: DashMap::new(),
            action,
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) const fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    /// Schedules `action(key, param)` after `delay`, superseding any pending
    /// run for `key`.
    pub(crate) fn invoke(
        self: &Arc<Self>,
        key: K,
        param: T,
        delay: Duration,
    ) -> Result<(), EngineError> {
        self.ensure_open()?;

        let timer = TimerHandle::new();
        if let Some(previous) = self.slots.insert(key.clone(), timer.clone()) {
            if previous.cancel() {
                tracing::debug!(engine = %self.settings.label, "Superseded pending run");
            }
        }

        // A concurrent shutdown may have cleared the map before our insert.
        if self.closed.load(Ordering::SeqCst) {
            self.discard(&key, &timer);
            return Err(self.shut_down_error());
        }

        let job = self.fire_job(key.clone(), param, timer.id());
        if let Err(e) = self.scheduler.schedule(delay, &timer, job) {
            self.discard(&key, &timer);
            return Err(e.into());
        }

        tracing::debug!(
            engine = %self.settings.label,
            ?delay,
            "Scheduled debounced run"
        );
        Ok(())
    }

    /// Cancels and forgets the pending run for `key`.
    ///
    /// Returns `true` if a pending run was cancelled.
    pub(crate) fn remove_key(&self, key: &K) -> bool {
        self.slots
            .remove(key)
            .is_some_and(|(_, timer)| timer.cancel())
    }

    pub(crate) fn is_pending(&self, key: &K) -> bool {
        self.slots.get(key).is_some_and(|timer| timer.is_armed())
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().is_armed())
            .count()
    }

    /// Cancels and forgets every pending run.
    pub(crate) fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        // `retain` holds each shard's lock while visiting it, so no insert
        // can slip between the cancel and the removal.
        self.slots.retain(|_, timer| {
            if timer.cancel() {
                cancelled += 1;
            }
            false
        });
        cancelled
    }

    pub(crate) fn close(&self) {
        let first = !self.closed.swap(true, Ordering::SeqCst);
        let cancelled = self.cancel_all();
        // A scheduler handed in by the caller may serve other engines.
        if self.owns_scheduler {
            self.scheduler.shutdown();
        }

        if first {
            tracing::info!(
                engine = %self.settings.label,
                cancelled,
                "Debounce engine shut down"
            );
        }
    }

    pub(crate) fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(self.shut_down_error());
        }
        Ok(())
    }

    fn shut_down_error(&self) -> EngineError {
        EngineError::ShutDown {
            engine: self.settings.label.clone(),
        }
    }

    /// Removes `timer` from the map if it is still the current one, and
    /// cancels it.
    fn discard(&self, key: &K, timer: &TimerHandle) {
        let id = timer.id();
        self.slots.remove_if(key, |_, current| current.id() == id);
        timer.cancel();
    }

    fn fire_job(self: &Arc<Self>, key: K, param: T, timer_id: u64) -> Job {
        let core: Weak<Self> = Arc::downgrade(self);
        Box::new(move || {
            let Some(core) = core.upgrade() else {
                return;
            };
            // Leave the slot free before running, so the action may
            // re-trigger its own key.
            core.slots
                .remove_if(&key, |_, current| current.id() == timer_id);
            (core.action)(key, param);
        })
    }
}

impl<K, T> Drop for DebounceCore<K, T>
where
    K: Hash + Eq,
{
    fn drop(&mut self) {
        for entry in &self.slots {
            entry.value().cancel();
        }
    }
}

impl<K, T> ManagedEngine for DebounceCore<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    fn label(&self) -> &str {
        &self.settings.label
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Debounce
    }

    fn shape(&self) -> KeyShape {
        self.settings.shape
    }

    fn key_class(&self) -> &KeyClass {
        &self.settings.key_class
    }

    fn delay(&self) -> Duration {
        self.settings.delay
    }

    fn auto_shutdown(&self) -> bool {
        self.settings.auto_shutdown
    }

    fn remove_erased(&self, key: &dyn Any) -> Removal {
        let Some(key) = key.downcast_ref::<K>() else {
            return Removal::KeyTypeMismatch;
        };
        match self.slots.remove(key) {
            Some((_, timer)) => {
                timer.cancel();
                Removal::Removed
            }
            None => Removal::Absent,
        }
    }

    fn clear_all(&self) {
        self.cancel_all();
    }

    fn shutdown(&self) {
        self.close();
    }
}
