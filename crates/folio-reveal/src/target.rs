#![forbid(unsafe_code)]

//! Identity of tracked elements.

use serde::{Deserialize, Serialize};

/// Identifier of one tracked element, unique within its section.
///
/// Whole-section reveals use a fixed name (`"about"`); list reveals use the
/// entity key supplied by the data provider, which may be numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetId {
    Key(u64),
    Name(String),
}

impl TargetId {
    /// Parse an id read back from a DOM attribute.
    ///
    /// Attributes are always strings, so canonical decimals map to
    /// [`TargetId::Key`]. Anything that would not print back identically
    /// (`"007"`, `"+7"`) stays a name, so distinct strings never collapse
    /// into one key.
    #[must_use]
    pub fn from_attribute(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.bytes().all(|b| b.is_ascii_digit())
            && let Ok(key) = raw.parse::<u64>()
            && key.to_string() == raw
        {
            return Self::Key(key);
        }
        Self::Name(raw.to_owned())
    }

    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Key(_) => None,
        }
    }
}

impl core::fmt::Display for TargetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for TargetId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for TargetId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<u64> for TargetId {
    fn from(key: u64) -> Self {
        Self::Key(key)
    }
}

impl From<u32> for TargetId {
    fn from(key: u32) -> Self {
        Self::Key(u64::from(key))
    }
}

/// An element registered for reveal tracking.
///
/// `handle` is whatever the rendering layer uses to point at a live element.
/// The engine only borrows it for the duration of an `observe` call; the
/// watcher decides what, if anything, it retains.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedTarget<H> {
    pub id: TargetId,
    pub handle: H,
}

impl<H> TrackedTarget<H> {
    pub fn new(id: impl Into<TargetId>, handle: H) -> Self {
        Self {
            id: id.into(),
            handle,
        }
    }
}

impl<H> From<(TargetId, H)> for TrackedTarget<H> {
    fn from((id, handle): (TargetId, H)) -> Self {
        Self { id, handle }
    }
}
