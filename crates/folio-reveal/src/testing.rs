#![forbid(unsafe_code)]

//! Deterministic in-memory watcher for tests.
//!
//! [`RecordingWatcher`] never produces events on its own: tests feed
//! [`IntersectionEvent`](crate::IntersectionEvent)s to the controller
//! directly and then inspect the recorded calls.

use std::collections::{HashMap, HashSet};

use crate::config::Threshold;
use crate::error::WatcherError;
use crate::target::TargetId;
use crate::watcher::{ViewportWatcher, WatchToken};

/// One call made against a [`RecordingWatcher`].
#[derive(Debug, Clone, PartialEq)]
pub enum WatchCall {
    Observe { id: TargetId, threshold: Threshold },
    Unobserve { id: TargetId },
}

/// Watcher that records calls and lets tests detach targets or break the
/// platform primitive.
///
/// Handles are `()`; attachment is tracked by id.
#[derive(Debug, Default)]
pub struct RecordingWatcher {
    next_token: u64,
    live: HashMap<WatchToken, TargetId>,
    detached: HashSet<TargetId>,
    unavailable: Option<String>,
    calls: Vec<WatchCall>,
    granted: HashMap<TargetId, usize>,
}

impl RecordingWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Following observes of `id` report "not attached".
    pub fn detach(&mut self, id: impl Into<TargetId>) {
        self.detached.insert(id.into());
    }

    pub fn attach(&mut self, id: impl Into<TargetId>) {
        self.detached.remove(&id.into());
    }

    /// Following observes fail with [`WatcherError::Unavailable`].
    pub fn set_unavailable(&mut self, reason: impl Into<String>) {
        self.unavailable = Some(reason.into());
    }

    #[must_use]
    pub fn calls(&self) -> &[WatchCall] {
        &self.calls
    }

    #[must_use]
    pub fn observe_count(&self, id: &TargetId) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, WatchCall::Observe { id: seen, .. } if seen == id))
            .count()
    }

    /// Observes of `id` that returned a token, i.e. started a live
    /// observation. Observes of detached targets are not counted.
    #[must_use]
    pub fn granted_count(&self, id: &TargetId) -> usize {
        self.granted.get(id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn unobserve_count(&self, id: &TargetId) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, WatchCall::Unobserve { id: seen } if seen == id))
            .count()
    }

    #[must_use]
    pub fn is_watching(&self, id: &TargetId) -> bool {
        self.live.values().any(|live| live == id)
    }

    /// Observations not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl ViewportWatcher for RecordingWatcher {
    type Handle = ();

    fn observe(
        &mut self,
        id: &TargetId,
        _handle: &(),
        threshold: Threshold,
    ) -> Result<Option<WatchToken>, WatcherError> {
        if let Some(reason) = &self.unavailable {
            return Err(WatcherError::Unavailable(reason.clone()));
        }
        self.calls.push(WatchCall::Observe {
            id: id.clone(),
            threshold,
        });
        if self.detached.contains(id) {
            return Ok(None);
        }
        self.next_token += 1;
        let token = WatchToken::new(self.next_token);
        self.live.insert(token, id.clone());
        *self.granted.entry(id.clone()).or_default() += 1;
        Ok(Some(token))
    }

    fn unobserve(&mut self, token: WatchToken) {
        if let Some(id) = self.live.remove(&token) {
            self.calls.push(WatchCall::Unobserve { id });
        }
    }
}
