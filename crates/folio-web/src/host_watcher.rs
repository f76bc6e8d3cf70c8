#![forbid(unsafe_code)]

//! Viewport watcher driven by a JavaScript host.
//!
//! The host owns the real `IntersectionObserver`s. Instead of touching the
//! DOM, [`HostWatcher`] appends [`WatchCommand`]s to a shared
//! [`CommandFeed`] that the host drains after every call, and the host
//! reports back which elements are currently mounted.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use folio_reveal::{TargetId, Threshold, ViewportWatcher, WatchToken, WatcherError};
use folio_sections::SectionKind;
use serde::Serialize;
use tracing::trace;

/// Instruction for the host's observer bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WatchCommand {
    Observe {
        section: SectionKind,
        id: TargetId,
        threshold: f64,
        root_margin: String,
    },
    Unobserve {
        section: SectionKind,
        id: TargetId,
    },
}

impl WatchCommand {
    #[must_use]
    pub fn id(&self) -> &TargetId {
        match self {
            Self::Observe { id, .. } | Self::Unobserve { id, .. } => id,
        }
    }
}

/// Shared outbox of [`WatchCommand`]s.
///
/// Cloning creates another handle to the same queue.
#[derive(Debug, Clone, Default)]
pub struct CommandFeed {
    queue: Rc<RefCell<Vec<WatchCommand>>>,
}

impl CommandFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: WatchCommand) {
        self.queue.borrow_mut().push(command);
    }

    /// Drain everything queued so far, oldest first.
    pub fn take(&self) -> Vec<WatchCommand> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

#[derive(Debug)]
pub struct HostWatcher {
    section: SectionKind,
    root_margin: String,
    feed: CommandFeed,
    mounted: HashSet<TargetId>,
    live: HashMap<WatchToken, TargetId>,
    next_token: u64,
    unavailable: Option<String>,
}

impl HostWatcher {
    pub fn new(section: SectionKind, feed: CommandFeed, root_margin: impl Into<String>) -> Self {
        Self {
            section,
            root_margin: root_margin.into(),
            feed,
            mounted: HashSet::new(),
            live: HashMap::new(),
            next_token: 0,
            unavailable: None,
        }
    }

    /// Record ids whose elements the host has attached to the document.
    pub fn mark_mounted<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = TargetId>,
    {
        self.mounted.extend(ids);
    }

    /// Forget every mounted id, e.g. when the section's subtree is removed.
    pub fn clear_mounted(&mut self) {
        self.mounted.clear();
    }

    /// Subsequent `observe` calls fail with [`WatcherError::Unavailable`].
    pub fn set_unavailable(&mut self, reason: impl Into<String>) {
        self.unavailable = Some(reason.into());
    }

    #[must_use]
    pub fn is_mounted(&self, id: &TargetId) -> bool {
        self.mounted.contains(id)
    }

    /// Number of observations not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn section(&self) -> SectionKind {
        self.section
    }
}

impl ViewportWatcher for HostWatcher {
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
        if !self.mounted.contains(id) {
            return Ok(None);
        }
        self.next_token += 1;
        let token = WatchToken::new(self.next_token);
        self.live.insert(token, id.clone());
        trace!(section = self.section.name(), %id, "queue observe");
        self.feed.push(WatchCommand::Observe {
            section: self.section,
            id: id.clone(),
            threshold: threshold.fraction(),
            root_margin: self.root_margin.clone(),
        });
        Ok(Some(token))
    }

    fn unobserve(&mut self, token: WatchToken) {
        let Some(id) = self.live.remove(&token) else {
            return;
        };
        trace!(section = self.section.name(), %id, "queue unobserve");
        self.feed.push(WatchCommand::Unobserve {
            section: self.section,
            id,
        });
    }
}
