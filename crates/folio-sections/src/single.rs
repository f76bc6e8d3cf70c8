#![forbid(unsafe_code)]

//! Whole-section reveal: one fixed target per section.

use folio_reveal::{
    IntersectionEvent, Registration, RevealConfig, RevealController, TargetId, ViewportWatcher,
};

use crate::binding::SectionKind;

/// A section that reveals as one unit the first time its root element
/// comes into view.
#[derive(Debug)]
pub struct SingleTargetSection<W: ViewportWatcher> {
    kind: SectionKind,
    target: TargetId,
    reveal: RevealController<W>,
}

impl<W: ViewportWatcher> SingleTargetSection<W> {
    /// The target id comes from the section's fixed id scheme, falling back
    /// to the section name.
    pub fn new(kind: SectionKind, watcher: W, config: RevealConfig) -> Self {
        let target = kind
            .id_scheme()
            .fixed_id()
            .unwrap_or_else(|| TargetId::from(kind.name()));
        Self {
            kind,
            target,
            reveal: RevealController::new(watcher, config).with_label(kind.name()),
        }
    }

    /// Register the section root. Safe to call on every render pass.
    pub fn mount(&mut self, handle: &W::Handle) -> Registration {
        self.reveal.register(self.target.clone(), handle)
    }

    /// Returns `true` if this event revealed the section.
    pub fn handle_event(&mut self, event: &IntersectionEvent) -> bool {
        self.reveal.handle_event(event).is_some()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.reveal.is_revealed(&self.target)
    }

    /// Release the observation if the section never came into view.
    pub fn unmount(&mut self) -> usize {
        self.reveal.teardown()
    }

    #[must_use]
    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    #[must_use]
    pub fn target(&self) -> &TargetId {
        &self.target
    }

    #[must_use]
    pub fn controller(&self) -> &RevealController<W> {
        &self.reveal
    }

    pub fn controller_mut(&mut self) -> &mut RevealController<W> {
        &mut self.reveal
    }
}
