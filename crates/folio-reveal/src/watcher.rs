#![forbid(unsafe_code)]

//! Viewport intersection watcher seam.
//!
//! A [`ViewportWatcher`] wraps whatever the host offers for visibility
//! detection (`IntersectionObserver` in browsers, a command feed for a
//! JavaScript host, an in-memory recorder in tests). It only *reports*;
//! it never touches reveal state. Reports reach the controller as
//! [`IntersectionEvent`]s on the host's own task queue.

use crate::config::Threshold;
use crate::error::WatcherError;
use crate::target::TargetId;

/// Opaque handle for one live observation, returned by
/// [`ViewportWatcher::observe`] and consumed by
/// [`ViewportWatcher::unobserve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchToken(u64);

impl WatchToken {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One visibility report for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEvent {
    pub id: TargetId,
    /// Whether the target currently satisfies its threshold.
    pub is_intersecting: bool,
    /// Visible fraction of the target at report time, `0.0` when unknown.
    pub ratio: f64,
}

impl IntersectionEvent {
    /// Target came into view.
    pub fn entering(id: impl Into<TargetId>) -> Self {
        Self {
            id: id.into(),
            is_intersecting: true,
            ratio: 1.0,
        }
    }

    /// Target is (still) out of view.
    pub fn leaving(id: impl Into<TargetId>) -> Self {
        Self {
            id: id.into(),
            is_intersecting: false,
            ratio: 0.0,
        }
    }

    #[must_use]
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }
}

/// Platform visibility primitive.
pub trait ViewportWatcher {
    /// Whatever the rendering layer uses to point at an element.
    type Handle;

    /// Start watching `handle` as target `id`.
    ///
    /// Returns `Ok(None)` when the element is not attached to the render
    /// tree; that is a no-op and the caller retries after mount.
    /// Returns `Err` only when the primitive itself is unusable.
    fn observe(
        &mut self,
        id: &TargetId,
        handle: &Self::Handle,
        threshold: Threshold,
    ) -> Result<Option<WatchToken>, WatcherError>;

    /// Stop one observation. Unknown or already released tokens are ignored.
    fn unobserve(&mut self, token: WatchToken);
}

impl<W: ViewportWatcher + ?Sized> ViewportWatcher for Box<W> {
    type Handle = W::Handle;

    fn observe(
        &mut self,
        id: &TargetId,
        handle: &Self::Handle,
        threshold: Threshold,
    ) -> Result<Option<WatchToken>, WatcherError> {
        (**self).observe(id, handle, threshold)
    }

    fn unobserve(&mut self, token: WatchToken) {
        (**self).unobserve(token);
    }
}
