//! Keyed throttle state shared by all public variants.

use std::any::Any;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::engine::{EngineKind, KeyClass, KeyShape, ManagedEngine, Removal};
use crate::time::Clock;

/// Callback run on admitted calls.
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

/// Last admission time per key.
///
/// # Invariant
///
/// A key is admitted iff it has no stamp or `now - stamp >= window`. The
/// check and the stamp update run under the map entry's shard lock, so of
/// two racing calls for the same key at most one is admitted per window.
/// The stamp records admission time; how long the action takes does not
/// move the window.
pub(crate) struct ThrottleCore<K, T>
where
    K: Hash + Eq,
{
    settings: CoreSettings,
    clock: Arc<dyn Clock>,
    stamps: DashMap<K, u64>,
    action: Action<K, T>,
}

impl<K, T> ThrottleCore<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    pub(crate) fn new(settings: CoreSettings, clock: Arc<dyn Clock>, action: Action<K, T>) -> Self {
        Self {
            settings,
            clock,
            stamps: DashMap::new(),
            action,
        }
    }

    pub(crate) const fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    /// Admits `key` if its window has elapsed, recording the admission.
    pub(crate) fn can_execute(&self, key: &K, window: Duration) -> bool {
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        let now = self.clock.now_millis();

        let admitted = match self.stamps.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if now.saturating_sub(*entry.get()) >= window_ms {
                    entry.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        };

        tracing::trace!(engine = %self.settings.label, admitted, "Throttle check");
        admitted
    }

    /// Runs the action if `key` is admitted. Returns whether it ran.
    pub(crate) fn invoke(&self, key: K, param: T, window: Duration) -> bool {
        // The entry lock is released before the action runs, so the action
        // may call back into this engine.
        if !self.can_execute(&key, window) {
            return false;
        }
        (self.action)(key, param);
        true
    }

    pub(crate) fn remove_key(&self, key: &K) -> bool {
        self.stamps.remove(key).is_some()
    }

    pub(crate) fn tracked_count(&self) -> usize {
        self.stamps.len()
    }

    pub(crate) fn is_tracked(&self, key: &K) -> bool {
        self.stamps.contains_key(key)
    }

    pub(crate) fn forget_all(&self) -> usize {
        let mut forgotten = 0;
        self.stamps.retain(|_, _| {
            forgotten += 1;
            false
        });
        forgotten
    }
}

impl<K, T> ManagedEngine for ThrottleCore<K, T>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    fn label(&self) -> &str {
        &self.settings.label
    }

    fn kind(&self) -> EngineKind {
        EngineKind::Throttle
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
        match key.downcast_ref::<K>() {
            None => Removal::KeyTypeMismatch,
            Some(key) if self.remove_key(key) => Removal::Removed,
            Some(_) => Removal::Absent,
        }
    }

    fn clear_all(&self) {
        self.forget_all();
    }

    fn shutdown(&self) {
        let forgotten = self.forget_all();
        tracing::info!(
            engine = %self.settings.label,
            forgotten,
            "Throttle engine shut down"
        );
    }
}
