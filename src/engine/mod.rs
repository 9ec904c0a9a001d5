//! Shared vocabulary for debounce and throttle engines.
//!
//! This module provides:
//! - Key classification for lifecycle fan-out ([`KeyClass`], [`KeyShape`])
//! - Engine identity ([`EngineKind`])
//! - The type-erased lifecycle surface used by the directory ([`ManagedEngine`], [`Removal`])
//! - Error handling ([`BuildError`], [`EngineError`])

mod error;
mod key;

pub use error::{BuildError, EngineError};
pub use key::{KeyClass, KeyShape};

use std::any::Any;
use std::fmt;
use std::time::Duration;

/// Which behavior an engine implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Trailing-edge coalescing: the last trigger in a quiet window fires.
    Debounce,
    /// Leading-edge rate limit: the first trigger fires, the rest are dropped.
    Throttle,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debounce => write!(f, "debounce"),
            Self::Throttle => write!(f, "throttle"),
        }
    }
}

/// Outcome of removing a key through the type-erased surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The engine held state for the key and discarded it.
    Removed,
    /// The key has the right type but the engine held no state for it.
    Absent,
    /// The key is not of the engine's key type.
    KeyTypeMismatch,
}

/// Lifecycle surface every engine exposes to a
/// [`Directory`](crate::directory::Directory).
///
/// The directory never touches an engine's per-key state directly; it only
/// calls these methods.
pub trait ManagedEngine: Send + Sync {
    /// Human-readable name used in logs.
    fn label(&self) -> &str;

    /// Debounce or throttle.
    fn kind(&self) -> EngineKind;

    /// Key arity of the public handle.
    fn shape(&self) -> KeyShape;

    /// Logical class of the keys this engine tracks.
    fn key_class(&self) -> &KeyClass;

    /// Configured window length.
    fn delay(&self) -> Duration;

    /// Whether [`Directory::shutdown_all`](crate::directory::Directory::shutdown_all)
    /// shuts this engine down under the default policy.
    fn auto_shutdown(&self) -> bool;

    /// Discards the state held for `key`, if `key` has this engine's key type.
    fn remove_erased(&self, key: &dyn Any) -> Removal;

    /// Discards the state held for every key.
    fn clear_all(&self);

    /// Clears all state and releases owned resources.
    fn shutdown(&self);
}

/// Rejects delays shorter than one millisecond.
pub(crate) fn validate_delay(delay: Duration) -> Result<(), BuildError> {
    if delay.as_millis() == 0 {
        return Err(BuildError::InvalidDelay { delay });
    }
    Ok(())
}

/// Rejects blank key classes for keyed engines.
pub(crate) fn validate_key_class(class: &KeyClass) -> Result<(), BuildError> {
    if class.is_blank() {
        return Err(BuildError::InvalidKeyClass {
            class: class.as_str().to_string(),
        });
    }
    Ok(())
}
