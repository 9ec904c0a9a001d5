//! Public throttle handles, one per key arity.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{KeyClass, ManagedEngine};

use super::state::ThrottleCore;

/// Throttle with a single global slot.
///
/// Cloning yields another handle to the same engine.
pub struct Singleton {
    pub(super) core: Arc<ThrottleCore<(), ()>>,
}

impl Singleton {
    /// Admission check without running the action.
    ///
    /// Returns `true` and starts a new window if the previous window has
    /// elapsed; otherwise returns `false` and changes nothing.
    pub fn can_execute(&self) -> bool {
        self.core.can_execute(&(), self.core.settings().delay)
    }

    /// Admission check against a per-call window.
    pub fn can_execute_within(&self, window: Duration) -> bool {
        self.core.can_execute(&(), window)
    }

    /// Runs the action now if admitted. Returns whether it ran.
    pub fn invoke(&self) -> bool {
        self.core.invoke((), (), self.core.settings().delay)
    }

    /// Like [`invoke`](Self::invoke) with a per-call window.
    pub fn invoke_within(&self, window: Duration) -> bool {
        self.core.invoke((), (), window)
    }

    /// Forgets the last admission, so the next call is admitted.
    pub fn reset(&self) -> bool {
        self.core.remove_key(&())
    }

    /// Same as [`reset`](Self::reset); provided for parity with keyed handles.
    pub fn clear_all(&self) {
        self.core.forget_all();
    }

    /// Shuts the engine down. Throttles hold no timers, so this forgets
    /// every recorded admission and later calls keep working.
    pub fn shutdown(&self) {
        ManagedEngine::shutdown(self.core.as_ref());
    }

    /// Configured window.
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

/// Throttle with an independent window per key.
pub struct Simple<K>
where
    K: Hash + Eq,
{
    pub(super) core: Arc<ThrottleCore<K, ()>>,
}

impl<K> Simple<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    /// Admission check for `key` without running the action.
    pub fn can_execute(&self, key: &K) -> bool {
        self.core.can_execute(key, self.core.settings().delay)
    }

    /// Admission check for `key` against a per-call window.
    pub fn can_execute_within(&self, key: &K, window: Duration) -> bool {
        self.core.can_execute(key, window)
    }

    /// Runs `action(key)` now if admitted. Returns whether it ran.
    pub fn invoke(&self, key: K) -> bool {
        self.core.invoke(key, (), self.core.settings().delay)
    }

    /// Like [`invoke`](Self::invoke) with a per-call window.
    pub fn invoke_within(&self, key: K, window: Duration) -> bool {
        self.core.invoke(key, (), window)
    }

    /// Forgets the last admission of `key`. Returns `true` if one was recorded.
    pub fn remove_key(&self, key: &K) -> bool {
        self.core.remove_key(key)
    }

    /// Returns `true` if an admission is recorded for `key`.
    #[must_use]
    pub fn is_tracked(&self, key: &K) -> bool {
        self.core.is_tracked(key)
    }

    /// Number of keys with a recorded admission.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.core.tracked_count()
    }

    /// Forgets every recorded admission.
    pub fn clear_all(&self) {
        self.core.forget_all();
    }

    /// Shuts the engine down. Throttles hold no timers, so this forgets
    /// every recorded admission and later calls keep working.
    pub fn shutdown(&self) {
        ManagedEngine::shutdown(self.core.as_ref());
    }

    /// Configured window.
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

/// Throttle with a window per key and an auxiliary value.
///
/// Every admitted call passes its own value to the action. Rejected calls
/// never reach the action, so no value is ever dropped in favor of another.
pub struct Parameterized<K, T>
where
    K: Hash + Eq,
{
    pub(super) core: Arc<ThrottleCore<K, T>>,
}

impl<K, T> Parameterized<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    /// Admission check for `key` without running the action.
    pub fn can_execute(&self, key: &K) -> bool {
        self.core.can_execute(key, self.core.settings().delay)
    }

    /// Admission check for `key` against a per-call window.
    pub fn can_execute_within(&self, key: &K, window: Duration) -> bool {
        self.core.can_execute(key, window)
    }

    /// Runs `action(key, param)` now if admitted. Returns whether it ran.
    pub fn invoke(&self, key: K, param: T) -> bool {
        self.core.invoke(key, param, self.core.settings().delay)
    }

    /// Like [`invoke`](Self::invoke) with a per-call window.
    pub fn invoke_within(&self, key: K, param: T, window: Duration) -> bool {
        self.core.invoke(key, param, window)
    }

    /// Forgets the last admission of `key`. Returns `true` if one was recorded.
    pub fn remove_key(&self, key: &K) -> bool {
        self.core.remove_key(key)
    }

    /// Returns `true` if an admission is recorded for `key`.
    #[must_use]
    pub fn is_tracked(&self, key: &K) -> bool {
        self.core.is_tracked(key)
    }

    /// Number of keys with a recorded admission.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.core.tracked_count()
    }

    /// Forgets every recorded admission.
    pub fn clear_all(&self) {
        self.core.forget_all();
    }

    /// Shuts the engine down. Throttles hold no timers, so this forgets
    /// every recorded admission and later calls keep working.
    pub fn shutdown(&self) {
        ManagedEngine::shutdown(self.core.as_ref());
    }

    /// Configured window.
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
        f.debug_struct("throttle::Singleton")
            .field("settings", self.core.settings())
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq + Clone + Send + Sync + 'static> fmt::Debug for Simple<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("throttle::Simple")
            .field("settings", self.core.settings())
            .field("tracked", &self.core.tracked_count())
            .finish_non_exhaustive()
    }
}

impl<K, T> fmt::Debug for Parameterized<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("throttle::Parameterized")
            .field("settings", self.core.settings())
            .field("tracked", &self.core.tracked_count())
            .finish_non_exhaustive()
    }
}
