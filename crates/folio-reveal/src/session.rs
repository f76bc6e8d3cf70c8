#![forbid(unsafe_code)]

//! Live observations of one mounted section.

use std::collections::HashMap;

use crate::target::TargetId;
use crate::watcher::WatchToken;

/// Pending targets of one section, each with its watch token.
///
/// Exists from mount to unmount. Every id in the session is still
/// unrevealed; an id leaves on reveal and is never re-added. Closing the
/// session hands back every remaining token so the owner can release it.
#[derive(Debug, Default)]
pub struct ObservationSession {
    pending: HashMap<TargetId, WatchToken>,
    closed: bool,
}

impl ObservationSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pending observation. Refused once closed or if `id` is
    /// already present.
    pub fn insert(&mut self, id: TargetId, token: WatchToken) -> bool {
        if self.closed || self.pending.contains_key(&id) {
            return false;
        }
        self.pending.insert(id, token);
        true
    }

    /// Remove `id`, returning its token for release.
    pub fn release(&mut self, id: &TargetId) -> Option<WatchToken> {
        self.pending.remove(id)
    }

    /// Hand back every pending observation, ordered by id, leaving the
    /// session open.
    pub fn drain(&mut self) -> Vec<(TargetId, WatchToken)> {
        let mut drained: Vec<_> = self.pending.drain().collect();
        drained.sort_by(|a, b| a.0.cmp(&b.0));
        drained
    }

    /// Close the session and hand back every pending observation.
    pub fn close(&mut self) -> Vec<(TargetId, WatchToken)> {
        self.closed = true;
        self.drain()
    }

    /// Reopen a closed, empty session for a remount.
    pub fn reopen(&mut self) {
        debug_assert!(self.pending.is_empty());
        self.closed = false;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.closed
    }
}
