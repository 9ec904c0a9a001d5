//! Key classification.

use std::borrow::Cow;
use std::fmt;

/// Tag naming the logical entity an engine's keys identify.
///
/// Eviction requests are routed by class rather than by inspecting Rust
/// types: an engine keyed by player ids declares `KeyClass::from_static("player")`,
/// and a disconnect handler evicts from every engine of that class. Two
/// representations of the same entity (a native handle and a proxy
/// wrapper, say) use two classes that the caller links as aliases in an
/// [`Eviction`](crate::directory::Eviction).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyClass(Cow<'static, str>);

impl KeyClass {
    /// Class used by singleton engines, which have no key.
    pub const UNIT: Self = Self::from_static("unit");

    /// Creates a class from a static name.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a class from an owned name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the class name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for KeyClass {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for KeyClass {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Key arity of an engine handle.
///
/// Fixed when the engine is built; never inspected per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyShape {
    /// No key: one global slot.
    Singleton,
    /// One key per slot.
    Simple,
    /// One key per slot plus an auxiliary value passed to the action.
    Parameterized,
}

impl fmt::Display for KeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => write!(f, "singleton"),
            Self::Simple => write!(f, "simple"),
            Self::Parameterized => write!(f, "parameterized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_and_owned_classes_compare_equal() {
        assert_eq!(KeyClass::from_static("player"), KeyClass::new("player"));
    }

    #[test]
    fn different_names_are_different_classes() {
        assert_ne!(KeyClass::from("player"), KeyClass::from("proxy-player"));
    }

    #[test]
    fn unit_class_name() {
        assert_eq!(KeyClass::UNIT.as_str(), "unit");
    }

    #[test]
    fn blank_detection() {
        assert!(KeyClass::new("").is_blank());
        assert!(KeyClass::new("  ").is_blank());
        assert!(!KeyClass::new("player").is_blank());
    }

    #[test]
    fn display_is_the_name() {
        assert_eq!(KeyClass::new("player").to_string(), "player");
    }

    #[test]
    fn shape_display() {
        assert_eq!(KeyShape::Singleton.to_string(), "singleton");
        assert_eq!(KeyShape::Simple.to_string(), "simple");
        assert_eq!(KeyShape::Parameterized.to_string(), "parameterized");
    }
}
