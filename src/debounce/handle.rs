//! Public debounce handles, one per key arity.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{EngineError, KeyClass};

use super::state::DebounceCore;

/// Debounce with a single global slot.
///
/// Each [`invoke`](Self::invoke) restarts the quiet period; the action runs
/// once the period elapses without another call.
///
/// Cloning yields another handle to the same engine.
pub struct Singleton {
    pub(super) core: Arc<DebounceCore<(), ()>>,
}

impl Singleton {
    /// Schedules the action after the configured delay, superseding any
    /// pending run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ShutDown`] after [`shutdown`](Self::shutdown),
    /// or [`EngineError::Schedule`] if the scheduler refuses the run.
    pub fn invoke(&self) -> Result<(), EngineError> {
        self.core.invoke((), (), self.core.settings().delay)
    }

    /// Like [`invoke`](Self::invoke) but waits `delay` instead of the
    /// configured delay for this call.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke).
    pub fn invoke_after(&self, delay: Duration) -> Result<(), EngineError> {
        self.core.invoke((), (), delay)
    }

    /// Cancels the pending run without executing it.
    ///
    /// Returns `true` if a pending run was cancelled.
    pub fn cancel(&self) -> bool {
        self.core.remove_key(&())
    }

    /// Returns `true` if a run is waiting to fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.core.is_pending(&())
    }

    /// Same as [`cancel`](Self::cancel); provided for parity with keyed handles.
    pub fn clear_all(&self) {
        self.core.cancel_all();
    }

    /// Cancels the pending run, rejects further calls, and releases the
    /// scheduler if it is dedicated. Idempotent.
    pub fn shutdown(&self) {
        self.core.close();
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.core.is_shut_down()
    }

    /// Configured quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.core.settings().delay
    }

    /// Label used in logs.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.core.settings().label
    }
}

/// Debounce with an independent slot per key.
///
/// Triggers for one key never delay or cancel another key's run.
pub struct Simple<K>
where
    K: Hash + Eq,
{
    pub(super) core: Arc<DebounceCore<K, ()>>,
}

impl<K> Simple<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    /// Schedules `action(key)` after the configured delay, superseding any
    /// pending run for the same key.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ShutDown`] after [`shutdown`](Self::shutdown),
    /// or [`EngineError::Schedule`] if the scheduler refuses the run.
    pub fn invoke(&self, key: K) -> Result<(), EngineError> {
        self.core.invoke(key, (), self.core.settings().delay)
    }

    /// Like [`invoke`](Self::invoke) with a per-call delay.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke).
    pub fn invoke_after(&self, key: K, delay: Duration) -> Result<(), EngineError> {
        self.core.invoke(key, (), delay)
    }

    /// Cancels and forgets the pending run for `key`. No-op if none.
    ///
    /// Returns `true` if a pending run was cancelled.
    pub fn remove_key(&self, key: &K) -> bool {
        self.core.remove_key(key)
    }

    /// Returns `true` if a run for `key` is waiting to fire.
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.core.is_pending(key)
    }

    /// Number of keys with a run waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.core.pending_count()
    }

    /// Cancels and forgets every pending run.
    pub fn clear_all(&self) {
        self.core.cancel_all();
    }

    /// Clears all runs, rejects further calls, and releases the scheduler
    /// if it is dedicated. Idempotent.
    pub fn shutdown(&self) {
        self.core.close();
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.core.is_shut_down()
    }

    /// Configured quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.core.settings().delay
    }

    /// Class of the keys this engine tracks.
    #[must_use]
    pub fn key_class(&self) -> &KeyClass {
        &self.core.settings().key_class
    }

    /// Label used in logs.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.core.settings().label
    }
}

/// Debounce with a slot per key and an auxiliary value.
///
/// Only the key takes part in coalescing. When a run fires it receives the
/// value from the last call before the quiet period; values from
/// superseded calls are dropped, never queued or merged.
pub struct Parameterized<K, T>
where
    K: Hash + Eq,
{
    pub(super) core: Arc<DebounceCore<K, T>>,
}

impl<K, T> Parameterized<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    /// Schedules `action(key, param)` after the configured delay,
    /// superseding any pending run (and its value) for the same key.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ShutDown`] after [`shutdown`](Self::shutdown),
    /// or [`EngineError::Schedule`] if the scheduler refuses the run.
    pub fn invoke(&self, key: K, param: T) -> Result<(), EngineError> {
        self.core.invoke(key, param, self.core.settings().delay)
    }

    /// Like [`invoke`](Self::invoke) with a per-call delay.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke).
    pub fn invoke_after(&self, key: K, param: T, delay: Duration) -> Result<(), EngineError> {
        self.core.invoke(key, param, delay)
    }

    /// Cancels and forgets the pending run for `key`. No-op if none.
    ///
    /// Returns `true` if a pending run was cancelled.
    pub fn remove_key(&self, key: &K) -> bool {
        self.core.remove_key(key)
    }

    /// Returns `true` if a run for `key` is waiting to fire.
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.core.is_pending(key)
    }

    /// Number of keys with a run waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.core.pending_count()
    }

    /// Cancels and forgets every pending run.
    pub fn clear_all(&self) {
        self.core.cancel_all();
    }

    /// Clears all runs, rejects further calls, and releases the scheduler
    /// if it is dedicated. Idempotent.
    pub fn shutdown(&self) {
        self.core.close();
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.core.is_shut_down()
    }

    /// Configured quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.core.settings().delay
    }

    /// Class of the keys this engine tracks.
    #[must_use]
    pub fn key_class(&self) -> &KeyClass {
        &self.core.settings().key_class
    }

    /// Label used in logs.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.core.settings().label
    }
}

impl Clone for Singleton {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<K: Hash + Eq> Clone for Simple<K> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<K: Hash + Eq, T> Clone for Parameterized<K, T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl fmt::Debug for Singleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("debounce::Singleton")
            .field("settings", self.core.settings())
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq + Clone + Send + Sync + 'static> fmt::Debug for Simple<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("debounce::Simple")
            .field("settings", self.core.settings())
            .field("pending", &self.core.pending_count())
            .finish_non_exhaustive()
    }
}

impl<K, T> fmt::Debug for Parameterized<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("debounce::Parameterized")
            .field("settings", self.core.settings())
            .field("pending", &self.core.pending_count())
            .finish_non_exhaustive()
    }
}
