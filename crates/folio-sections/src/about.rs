#![forbid(unsafe_code)]

//! About section: profile card from the left, bio from the right.

use folio_reveal::{RevealConfig, ViewportWatcher};

use crate::binding::SectionKind;
use crate::panes::{PaneLayout, TwoPaneSection};
use crate::presentation::Entrance;

pub const LAYOUT: PaneLayout = PaneLayout {
    left_slot: "profile",
    left: Entrance::slide_from_left(20.0, 1000),
    right_slot: "bio",
    right: Entrance::slide_from_right(20.0, 1000).delayed(300),
};

pub type AboutSection<W> = TwoPaneSection<W>;

#[must_use]
pub fn new<W: ViewportWatcher>(watcher: W) -> AboutSection<W> {
    with_config(watcher, SectionKind::About.default_config())
}

#[must_use]
pub fn with_config<W: ViewportWatcher>(watcher: W, config: RevealConfig) -> AboutSection<W> {
    TwoPaneSection::new(SectionKind::About, watcher, config, LAYOUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_reveal::IntersectionEvent;
    use folio_reveal::testing::RecordingWatcher;
    use pretty_assertions::assert_eq;

    #[test]
    fn panes_follow_reveal() {
        let mut about = new(RecordingWatcher::new());
        about.mount(&());

        assert_eq!(about.left_style().translate_x_px, -20.0);
        assert_eq!(about.right_style().translate_x_px, 20.0);
        assert_eq!(about.right_style().opacity, 0.0);

        about.handle_event(&IntersectionEvent::entering("about"));
        let [(left_slot, left), (right_slot, right)] = about.slot_styles();
        assert_eq!((left_slot, right_slot), ("profile", "bio"));
        assert_eq!(left.opacity, 1.0);
        assert_eq!(left.delay_ms, 0);
        assert_eq!(right.translate_x_px, 0.0);
        assert_eq!(right.delay_ms, 300);
    }

    #[test]
    fn uses_about_threshold() {
        let about = new(RecordingWatcher::new());
        assert_eq!(
            about.section().controller().config().threshold.fraction(),
            0.1
        );
        assert_eq!(about.section().target().to_string(), "about");
    }
}
