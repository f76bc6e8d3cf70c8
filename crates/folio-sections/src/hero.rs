#![forbid(unsafe_code)]

//! Hero section. It is on screen at page load, so it reveals on mount
//! instead of waiting for an intersection report.

use folio_reveal::{RevealStore, TargetId};
use tracing::debug;

use crate::binding::SectionKind;
use crate::presentation::{Entrance, TransitionStyle};

pub const INTRO: Entrance = Entrance::slide_up(40.0, 1000);
pub const VISUAL: Entrance = INTRO.delayed(300);

#[derive(Debug)]
pub struct HeroSection {
    target: TargetId,
    store: RevealStore,
}

impl Default for HeroSection {
    fn default() -> Self {
        Self::new()
    }
}

impl HeroSection {
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(RevealStore::new())
    }

    #[must_use]
    pub fn with_store(store: RevealStore) -> Self {
        let target = SectionKind::Hero
            .id_scheme()
            .fixed_id()
            .unwrap_or_else(|| TargetId::from(SectionKind::Hero.name()));
        Self { target, store }
    }

    /// Returns `true` on the first mount only.
    pub fn mount(&mut self) -> bool {
        let first = self.store.mark_revealed(self.target.clone());
        if first {
            debug!(section = "hero", "revealed on mount");
        }
        first
    }

    /// Full unmount and remount: the entrance plays again.
    pub fn remount(&mut self) -> bool {
        self.store.reset();
        self.mount()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.store.is_revealed(&self.target)
    }

    #[must_use]
    pub fn intro_style(&self) -> TransitionStyle {
        INTRO.resolve(self.is_visible())
    }

    #[must_use]
    pub fn visual_style(&self) -> TransitionStyle {
        VISUAL.resolve(self.is_visible())
    }

    #[must_use]
    pub fn store(&self) -> &RevealStore {
        &self.store
    }
}
