//! Key eviction requests.

use std::any::Any;
use std::fmt;

use crate::engine::KeyClass;

/// One key value tagged with the class of engines it applies to.
pub struct EvictionTarget {
    class: KeyClass,
    key: Box<dyn Any + Send + Sync>,
}

impl EvictionTarget {
    /// Creates a target for engines of `class` keyed by `K`.
    pub fn new<K>(class: impl Into<KeyClass>, key: K) -> Self
    where
        K: Any + Send + Sync,
    {
        Self {
            class: class.into(),
            key: Box::new(key),
        }
    }

    /// Class of engines this target applies to.
    #[must_use]
    pub const fn class(&self) -> &KeyClass {
        &self.class
    }

    /// The key value, type-erased.
    #[must_use]
    pub fn key(&self) -> &dyn Any {
        self.key.as_ref()
    }
}

impl fmt::Debug for EvictionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionTarget")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

/// Request to purge one logical entity from every engine.
///
/// An entity may be keyed differently by different engines: a disconnect
/// handler may know a player both by its native id and by a proxy wrapper.
/// The caller names every representation explicitly, as a primary target
/// plus aliases, each with its own class and key value.
///
/// # Example
///
/// ```
/// use keyed_gate::directory::Eviction;
///
/// #[derive(Clone, PartialEq, Eq, Hash)]
/// struct ProxyPlayer(u64);
///
/// let player_id = 42_u64;
/// let eviction = Eviction::new("player", player_id)
///     .alias("proxy-player", ProxyPlayer(player_id));
///
/// assert_eq!(eviction.targets().len(), 2);
/// ```
#[derive(Debug)]
pub struct Eviction {
    targets: Vec<EvictionTarget>,
}

impl Eviction {
    /// Creates a request for `key` in engines of `class`.
    pub fn new<K>(class: impl Into<KeyClass>, key: K) -> Self
    where
        K: Any + Send + Sync,
    {
        Self {
            targets: vec![EvictionTarget::new(class, key)],
        }
    }

    /// Creates a request for `key` and every alias `resolve` derives from it.
    ///
    /// `resolve` is the caller's alias-resolution function: given the
    /// primary key, it returns the other representations of the same
    /// entity.
    pub fn resolved<K, F>(class: impl Into<KeyClass>, key: K, resolve: F) -> Self
    where
        K: Any + Send + Sync,
        F: FnOnce(&K) -> Vec<EvictionTarget>,
    {
        let aliases = resolve(&key);
        let mut eviction = Self::new(class, key);
        eviction.targets.extend(aliases);
        eviction
    }

    /// Adds another representation of the same entity.
    #[must_use]
    pub fn alias<K>(mut self, class: impl Into<KeyClass>, key: K) -> Self
    where
        K: Any + Send + Sync,
    {
        self.targets.push(EvictionTarget::new(class, key));
        self
    }

    /// Class of the primary target.
    #[must_use]
    pub fn primary_class(&self) -> &KeyClass {
        self.targets[0].class()
    }

    /// All targets, primary first.
    #[must_use]
    pub fn targets(&self) -> &[EvictionTarget] {
        &self.targets
    }
}
