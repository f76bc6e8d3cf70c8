#![forbid(unsafe_code)]

//! Two-pane sections: a left and a right pane that slide in towards each
//! other when the section first comes into view. About and Contact are both
//! built on this.

use folio_reveal::{IntersectionEvent, Registration, RevealConfig, ViewportWatcher};

use crate::binding::SectionKind;
use crate::presentation::{Entrance, TransitionStyle};
use crate::single::SingleTargetSection;

/// Slot names and entrances for the two panes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneLayout {
    pub left_slot: &'static str,
    pub left: Entrance,
    pub right_slot: &'static str,
    pub right: Entrance,
}

#[derive(Debug)]
pub struct TwoPaneSection<W: ViewportWatcher> {
    section: SingleTargetSection<W>,
    layout: PaneLayout,
}

impl<W: ViewportWatcher> TwoPaneSection<W> {
    pub fn new(kind: SectionKind, watcher: W, config: RevealConfig, layout: PaneLayout) -> Self {
        Self {
            section: SingleTargetSection::new(kind, watcher, config),
            layout,
        }
    }

    pub fn mount(&mut self, handle: &W::Handle) -> Registration {
        self.section.mount(handle)
    }

    pub fn handle_event(&mut self, event: &IntersectionEvent) -> bool {
        self.section.handle_event(event)
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.section.is_visible()
    }

    pub fn unmount(&mut self) -> usize {
        self.section.unmount()
    }

    #[must_use]
    pub fn left_style(&self) -> TransitionStyle {
        self.layout.left.resolve(self.is_visible())
    }

    #[must_use]
    pub fn right_style(&self) -> TransitionStyle {
        self.layout.right.resolve(self.is_visible())
    }

    /// Both panes keyed by slot name.
    #[must_use]
    pub fn slot_styles(&self) -> [(&'static str, TransitionStyle); 2] {
        [
            (self.layout.left_slot, self.left_style()),
            (self.layout.right_slot, self.right_style()),
        ]
    }

    #[must_use]
    pub fn layout(&self) -> &PaneLayout {
        &self.layout
    }

    #[must_use]
    pub fn section(&self) -> &SingleTargetSection<W> {
        &self.section
    }

    pub fn section_mut(&mut self) -> &mut SingleTargetSection<W> {
        &mut self.section
    }
}
