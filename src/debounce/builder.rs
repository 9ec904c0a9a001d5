//! Construction of debounce engines.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::directory::Directory;
use crate::engine::{BuildError, KeyClass, KeyShape, validate_delay, validate_key_class};
use crate::scheduler::{Scheduler, TokioScheduler};

use super::state::{Action, CoreSettings, DebounceCore};
use super::{Parameterized, Simple, Singleton};

/// Builder for debounce engines.
///
/// Every engine is registered with a [`Directory`] as it is built, so the
/// directory can later evict keys from it and shut it down.
///
/// # Defaults
///
/// - `auto_shutdown`: `true`
/// - `scheduler`: a shared [`TokioScheduler`] on the calling thread's runtime
///
/// A scheduler passed to [`scheduler`](Self::scheduler) is borrowed: shutting
/// the engine down leaves it running for the other engines it serves. Only a
/// scheduler created through [`dedicated_scheduler`](Self::dedicated_scheduler)
/// belongs to the engine and stops with it.
/// - `label`: `"debounce:<key class>"`
///
/// # Example
///
/// ```
/// use keyed_gate::debounce::DebounceBuilder;
/// use keyed_gate::directory::Directory;
/// use keyed_gate::engine::KeyClass;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let directory = Directory::new();
/// let save = DebounceBuilder::new(Duration::from_millis(500))
///     .key_class(KeyClass::from_static("player"))
///     .simple(&directory, |player: u64| println!("saving {player}"))
///     .unwrap();
///
/// save.invoke(7).unwrap();
/// save.invoke(7).unwrap(); // restarts the quiet period
/// assert_eq!(save.pending_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DebounceBuilder {
    delay: Duration,
    key_class: Option<KeyClass>,
    label: Option<String>,
    auto_shutdown: bool,
    scheduler: SchedulerChoice,
}

/// Where an engine's timers run.
#[derive(Debug, Clone)]
enum SchedulerChoice {
    Current,
    Shared(Arc<dyn Scheduler>),
    Dedicated(String),
}

impl DebounceBuilder {
    /// Starts a builder with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            key_class: None,
            label: None,
            auto_shutdown: true,
            scheduler: SchedulerChoice::Current,
        }
    }

    /// Starts a builder with a quiet period in milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Sets the class of keys the engine tracks. Required for keyed engines.
    #[must_use]
    pub fn key_class(mut self, class: impl Into<KeyClass>) -> Self {
        self.key_class = Some(class.into());
        self
    }

    /// Sets the label used in logs.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets whether the directory's shutdown shuts this engine down.
    #[must_use]
    pub const fn auto_shutdown(mut self, enabled: bool) -> Self {
        self.auto_shutdown = enabled;
        self
    }

    /// Runs timers on `scheduler`, which the engine never shuts down.
    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = SchedulerChoice::Shared(scheduler);
        self
    }

    /// Runs timers on a one-worker runtime owned by the engine.
    ///
    /// The runtime is started at build time, its worker thread named
    /// `name`, and stopped when the engine shuts down.
    #[must_use]
    pub fn dedicated_scheduler(mut self, name: impl Into<String>) -> Self {
        self.scheduler = SchedulerChoice::Dedicated(name.into());
        self
    }

    /// Builds a debounce with one global slot.
    ///
    /// Any key class set on the builder is ignored; singletons use
    /// [`KeyClass::UNIT`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the delay is under 1ms or no scheduler is
    /// available.
    pub fn singleton<F>(mut self, directory: &Directory, action: F) -> Result<Singleton, BuildError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.key_class = Some(KeyClass::UNIT);
        let action: Action<(), ()> = Arc::new(move |(), ()| action());
        let core = self.build_core(KeyShape::Singleton, action)?;
        directory.register(&core);
        Ok(Singleton { core })
    }

    /// Builds a debounce with one slot per key.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the delay is under 1ms, the key class is
    /// missing or blank, or no scheduler is available.
    pub fn simple<K, F>(self, directory: &Directory, action: F) -> Result<Simple<K>, BuildError>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        F: Fn(K) + Send + Sync + 'static,
    {
        let action: Action<K, ()> = Arc::new(move |key, ()| action(key));
        let core = self.build_core(KeyShape::Simple, action)?;
        directory.register(&core);
        Ok(Simple { core })
    }

    /// Builds a debounce with one slot per key and an auxiliary value.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the delay is under 1ms, the key class is
    /// missing or blank, or no scheduler is available.
    pub fn parameterized<K, T, F>(
        self,
        directory: &Directory,
        action: F,
    ) -> Result<Parameterized<K, T>, BuildError>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        T: Send + 'static,
        F: Fn(K, T) + Send + Sync + 'static,
    {
        let action: Action<K, T> = Arc::new(action);
        let core = self.build_core(KeyShape::Parameterized, action)?;
        directory.register(&core);
        Ok(Parameterized { core })
    }

    fn build_core<K, T>(
        self,
        shape: KeyShape,
        action: Action<K, T>,
    ) -> Result<Arc<DebounceCore<K, T>>, BuildError>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        T: Send + 'static,
    {
        validate_delay(self.delay)?;
        let key_class = self.key_class.unwrap_or_else(|| KeyClass::new(""));
        validate_key_class(&key_class)?;

        let (scheduler, owns_scheduler): (Arc<dyn Scheduler>, bool) = match self.scheduler {
            SchedulerChoice::Current => (Arc::new(TokioScheduler::current()?), false),
            SchedulerChoice::Shared(scheduler) => (scheduler, false),
            SchedulerChoice::Dedicated(name) => (Arc::new(TokioScheduler::dedicated(&name)?), true),
        };

        let settings = CoreSettings {
            label: self
                .label
                .unwrap_or_else(|| format!("debounce:{key_class}")),
            key_class,
            shape,
            delay: self.delay,
            auto_shutdown: self.auto_shutdown,
        };

        Ok(Arc::new(DebounceCore::new(
            settings,
            scheduler,
            owns_scheduler,
            action,
        )))
    }
}
