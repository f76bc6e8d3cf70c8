#![forbid(unsafe_code)]

//! Navigation bar state: compact "scrolled" styling past a small offset,
//! and the mobile menu toggle.

use tracing::trace;

use crate::binding::SectionKind;

/// Scroll offset past which the bar switches to its compact style.
pub const SCROLLED_OFFSET_PX: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavState {
    scrolled: bool,
    menu_open: bool,
    offset_px: f64,
}

impl Default for NavState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavState {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_offset(SCROLLED_OFFSET_PX)
    }

    #[must_use]
    pub const fn with_offset(offset_px: f64) -> Self {
        Self {
            scrolled: false,
            menu_open: false,
            offset_px,
        }
    }

    /// Feed the current vertical scroll position. Returns `true` when the
    /// bar needs re-rendering.
    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        let scrolled = scroll_y > self.offset_px;
        if scrolled == self.scrolled {
            return false;
        }
        trace!(scroll_y, scrolled, "nav scroll state changed");
        self.scrolled = scrolled;
        true
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    /// Following a menu link closes the menu. Returns the anchor to scroll to.
    pub fn follow(&mut self, section: SectionKind) -> &'static str {
        self.menu_open = false;
        section.anchor()
    }

    #[must_use]
    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    #[must_use]
    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }
}
