//! Lifecycle directory of live engines.
//!
//! This module provides:
//! - The directory service object ([`Directory`], [`ShutdownPolicy`], [`ShutdownReport`])
//! - Key eviction requests with caller-supplied aliases ([`Eviction`], [`EvictionTarget`])
//!
//! The directory is constructed once by the application's composition root
//! and handed to every engine builder. It never owns engines: it holds weak
//! references, and engines dropped by their owners disappear from it.

mod eviction;


pub use eviction::{Eviction, EvictionTarget};

use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::engine::{ManagedEngine, Removal};

/// Which engines [`Directory::shutdown_all`] shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShutdownPolicy {
    /// Only engines built with `auto_shutdown(true)` (the default).
    #[default]
    AutoOnly,
    /// Every registered engine, regardless of its flag.
    All,
}

/// Counts produced by [`Directory::shutdown_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ShutdownReport {
    /// Engines that were shut down.
    pub shut_down: usize,
    /// Live engines left running because of their `auto_shutdown` flag.
    pub skipped: usize,
}

/// Registry of every engine built against it.
///
/// Cloning yields another handle to the same directory.
///
/// # Concurrency
///
/// Registration may run concurrently with eviction and shutdown. Both
/// bulk operations work on a snapshot taken at their start; an engine
/// registered while they run is not visited.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    policy: ShutdownPolicy,
    engines: RwLock<Vec<Weak<dyn ManagedEngine>>>,
}

impl Directory {
    /// Creates an empty directory with [`ShutdownPolicy::AutoOnly`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty directory with the given shutdown policy.
    #[must_use]
    pub fn with_policy(policy: ShutdownPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                engines: RwLock::default(),
            }),
        }
    }

    /// Returns the shutdown policy.
    #[must_use]
    pub fn policy(&self) -> ShutdownPolicy {
        self.inner.policy
    }

    /// Adds an engine.
    ///
    /// Engine builders call this once per engine; custom
    /// [`ManagedEngine`] implementations may call it themselves.
    pub fn register<E>(&self, engine: &Arc<E>)
    where
        E: ManagedEngine + 'static,
    {
        let weak: Weak<dyn ManagedEngine> = Arc::downgrade(engine) as Weak<dyn ManagedEngine>;
        self.inner
            .engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(weak);

        tracing::debug!(
            engine = engine.label(),
            kind = %engine.kind(),
            key_class = %engine.key_class(),
            "Registered engine"
        );
    }

    /// Number of live registered engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_engines()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Returns `true` if no live engine is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes the key described by `eviction` from every engine whose key
    /// class matches one of its targets.
    ///
    /// Each matching engine discards its state through its own removal
    /// operation; pending debounced runs are cancelled, throttle windows
    /// are reset. Returns the number of per-key entries removed.
    pub fn evict(&self, eviction: &Eviction) -> usize {
        let mut removed = 0;

        for engine in self.snapshot() {
            for target in eviction.targets() {
                if engine.key_class() != target.class() {
                    continue;
                }

                match engine.remove_erased(target.key()) {
                    Removal::Removed => removed += 1,
                    Removal::Absent => {}
                    Removal::KeyTypeMismatch => {
                        tracing::warn!(
                            engine = engine.label(),
                            key_class = %target.class(),
                            "Eviction key type does not match engine key type"
                        );
                    }
                }
            }
        }

        tracing::debug!(
            key_class = %eviction.primary_class(),
            removed,
            "Evicted key"
        );
        removed
    }

    /// Shuts down registered engines according to the policy, then empties
    /// the directory.
    ///
    /// Calling it again is harmless: the directory is already empty and the
    /// report is all zeros.
    pub fn shutdown_all(&self) -> ShutdownReport {
        let engines = std::mem::take(
            &mut *self
                .inner
                .engines
                .write()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let mut report = ShutdownReport::default();
        for engine in engines.iter().filter_map(Weak::upgrade) {
            if self.inner.policy == ShutdownPolicy::All || engine.auto_shutdown() {
                engine.shutdown();
                report.shut_down += 1;
            } else {
                report.skipped += 1;
            }
        }

        tracing::info!(
            shut_down = report.shut_down,
            skipped = report.skipped,
            "Directory shut down"
        );
        report
    }

    /// Upgrades every live engine and prunes dead entries.
    fn snapshot(&self) -> Vec<Arc<dyn ManagedEngine>> {
        let (live, dead) = {
            let engines = self.read_engines();
            let live: Vec<_> = engines.iter().filter_map(Weak::upgrade).collect();
            let dead = engines.len() - live.len();
            (live, dead)
        };

        if dead > 0 {
            self.inner
                .engines
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|weak| weak.strong_count() > 0);
        }

        live
    }

    fn read_engines(&self) -> std::sync::RwLockReadGuard<'_, Vec<Weak<dyn ManagedEngine>>> {
        self.inner
            .engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
