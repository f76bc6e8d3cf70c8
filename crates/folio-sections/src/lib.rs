#![forbid(unsafe_code)]

//! Portfolio page section bindings.
//!
//! Each section registers its element(s) with a
//! [`RevealController`](folio_reveal::RevealController) and maps reveal
//! state to entrance transitions:
//!
//! | Section  | Trigger      | Threshold | Targets        | Entrance                         |
//! |----------|--------------|-----------|----------------|----------------------------------|
//! | Hero     | mount        | –         | `home`         | rise 40px, second column +300ms  |
//! | About    | intersection | 0.1       | `about`        | panes from ±20px, right +300ms   |
//! | Projects | intersection | 0.2       | one per card   | rise 40px, 100ms stagger         |
//! | Skills   | intersection | 0.1       | `skills`       | cards rise + stagger, bars fill  |
//! | Contact  | intersection | 0.1       | `contact`      | panes from ±20px, right +300ms   |
//!
//! Sections are generic over the
//! [`ViewportWatcher`](folio_reveal::ViewportWatcher) so the same binding
//! runs against the browser, a JavaScript host feed, or a test recorder.

pub mod about;
pub mod binding;
pub mod contact;
pub mod hero;
pub mod nav;
pub mod panes;
pub mod presentation;
pub mod projects;
pub mod single;
pub mod skills;

pub use about::AboutSection;
pub use binding::{IdScheme, SectionKind, Trigger};
pub use contact::{ContactForm, ContactMessage, ContactSection, FormError, FormField};
pub use hero::HeroSection;
pub use nav::NavState;
pub use panes::{PaneLayout, TwoPaneSection};
pub use presentation::{BarStyle, Entrance, Pose, Stagger, TransitionStyle};
pub use projects::ProjectsSection;
pub use single::SingleTargetSection;
pub use skills::{CategoryFilter, Skill, SkillCategory, SkillsSection};
