//! Construction of throttle engines.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::directory::Directory;
use crate::engine::{BuildError, KeyClass, KeyShape, validate_delay, validate_key_class};
use crate::time::{Clock, MonotonicClock};

use super::state::{Action, CoreSettings, ThrottleCore};
use super::{Parameterized, Simple, Singleton};

/// Builder for throttle engines.
///
/// # Defaults
///
/// - `auto_shutdown`: `true`
/// - `clock`: a fresh [`MonotonicClock`]
/// - `label`: `"throttle:<key class>"`
///
/// # Example
///
/// ```
/// use keyed_gate::directory::Directory;
/// use keyed_gate::throttle::ThrottleBuilder;
/// use std::time::Duration;
///
/// let directory = Directory::new();
/// let cooldown = ThrottleBuilder::new(Duration::from_secs(3))
///     .key_class("player")
///     .simple(&directory, |player: u64| println!("{player} used the command"))
///     .unwrap();
///
/// assert!(cooldown.invoke(7));
/// assert!(!cooldown.invoke(7)); // still cooling down
/// assert!(cooldown.invoke(8)); // independent key
/// ```
#[derive(Clone)]
pub struct ThrottleBuilder {
    delay: Duration,
    key_class: Option<KeyClass>,
    label: Option<String>,
    auto_shutdown: bool,
    clock: Option<Arc<dyn Clock>>,
}

impl ThrottleBuilder {
    /// Starts a builder with the given minimum spacing between admissions.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            key_class: None,
            label: None,
            auto_shutdown: true,
            clock: None,
        }
    }

    /// Starts a builder with a window in milliseconds.
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

    /// Uses the given clock for admission checks.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds a throttle with one global window.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidDelay`] if the window is under 1ms.
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

    /// Builds a throttle with one window per key.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the window is under 1ms or the key class
    /// is missing or blank.
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

    /// Builds a throttle with one window per key and an auxiliary value.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the window is under 1ms or the key class
    /// is missing or blank.
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
    ) -> Result<Arc<ThrottleCore<K, T>>, BuildError>
    where
        K: Hash + Eq + Clone + Send + Sync + 'static,
        T: Send + 'static,
    {
        validate_delay(self.delay)?;
        let key_class = self.key_class.unwrap_or_else(|| KeyClass::new(""));
        validate_key_class(&key_class)?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));

        let settings = CoreSettings {
            label: self
                .label
                .unwrap_or_else(|| format!("throttle:{key_class}")),
            key_class,
            shape,
            delay: self.delay,
            auto_shutdown: self.auto_shutdown,
        };

        Ok(Arc::new(ThrottleCore::new(settings, clock, action)))
    }
}
