#![forbid(unsafe_code)]

//! Projects section: one target per project card, keyed by the project's
//! key from the data provider.
//!
//! The card list may arrive after the first mount and may be replaced as
//! data reloads. Every render pass calls [`ProjectsSection::sync`] with the
//! cards currently on the page; only cards never seen before are registered.

use std::collections::HashSet;

use folio_reveal::{
    IntersectionEvent, RevealConfig, RevealController, SyncReport, TargetId, TrackedTarget,
    ViewportWatcher,
};

use crate::binding::SectionKind;
use crate::presentation::{Entrance, Stagger, TransitionStyle};

pub const CARD: Entrance = Entrance::slide_up(40.0, 700);

#[derive(Debug)]
pub struct ProjectsSection<W: ViewportWatcher> {
    reveal: RevealController<W>,
    order: Vec<TargetId>,
    stagger: Stagger,
}

impl<W: ViewportWatcher> ProjectsSection<W> {
    pub fn new(watcher: W) -> Self {
        Self::with_config(watcher, SectionKind::Projects.default_config())
    }

    pub fn with_config(watcher: W, config: RevealConfig) -> Self {
        Self {
            reveal: RevealController::new(watcher, config).with_label(SectionKind::Projects.name()),
            order: Vec::new(),
            stagger: Stagger::LIST,
        }
    }

    #[must_use]
    pub fn with_stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = stagger;
        self
    }

    /// Reconcile with the cards currently rendered, in display order.
    /// A key listed twice keeps its first position and handle.
    pub fn sync<'a, I>(&mut self, cards: I) -> SyncReport
    where
        I: IntoIterator<Item = (TargetId, &'a W::Handle)>,
        W::Handle: 'a,
    {
        let mut seen = HashSet::new();
        let unique: Vec<TrackedTarget<&'a W::Handle>> = cards
            .into_iter()
            .filter(|(id, _)| seen.insert(id.clone()))
            .map(TrackedTarget::from)
            .collect();
        self.order = unique.iter().map(|card| card.id.clone()).collect();
        self.reveal.sync_targets(unique)
    }

    /// Returns the card revealed by this event, if any.
    pub fn handle_event(&mut self, event: &IntersectionEvent) -> Option<TargetId> {
        self.reveal.handle_event(event)
    }

    pub fn unmount(&mut self) -> usize {
        self.reveal.teardown()
    }

    #[must_use]
    pub fn is_revealed(&self, id: &TargetId) -> bool {
        self.reveal.is_revealed(id)
    }

    /// Style for one card. Cards not in the current list get index 0.
    #[must_use]
    pub fn card_style(&self, id: &TargetId) -> TransitionStyle {
        let index = self.order.iter().position(|seen| seen == id).unwrap_or(0);
        CARD.resolve_staggered(self.is_revealed(id), index, self.stagger)
    }

    /// Styles for every current card, in display order.
    #[must_use]
    pub fn card_styles(&self) -> Vec<(TargetId, TransitionStyle)> {
        self.order
            .iter()
            .enumerate()
            .map(|(index, id)| {
                (
                    id.clone(),
                    CARD.resolve_staggered(self.is_revealed(id), index, self.stagger),
                )
            })
            .collect()
    }

    /// Current cards in display order.
    #[must_use]
    pub fn cards(&self) -> &[TargetId] {
        &self.order
    }

    #[must_use]
    pub fn controller(&self) -> &RevealController<W> {
        &self.reveal
    }

    pub fn controller_mut(&mut self) -> &mut RevealController<W> {
        &mut self.reveal
    }
}
