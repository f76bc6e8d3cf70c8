#![forbid(unsafe_code)]

//! Skills section: a filterable grid of skill cards with level bars, plus a
//! tools strip. The whole section reveals as one target; the cards stagger
//! by their position in the *filtered* list, so switching category replays
//! the cascade from the first visible card.

use folio_reveal::{IntersectionEvent, Registration, RevealConfig, ViewportWatcher};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binding::SectionKind;
use crate::presentation::{BarStyle, Entrance, Stagger, TransitionStyle};
use crate::single::SingleTargetSection;

pub const CARD: Entrance = Entrance::slide_up(40.0, 700);
pub const TOOLS: Entrance = Entrance::slide_up(40.0, 1000);
pub const BAR_DURATION_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Frontend,
    Backend,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Proficiency in percent.
    pub level: u8,
    pub category: SkillCategory,
}

/// Category buttons above the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(SkillCategory),
}

impl CategoryFilter {
    pub const ALL: [Self; 4] = [
        Self::All,
        Self::Only(SkillCategory::Frontend),
        Self::Only(SkillCategory::Backend),
        Self::Only(SkillCategory::Other),
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "frontend" => Some(Self::Only(SkillCategory::Frontend)),
            "backend" => Some(Self::Only(SkillCategory::Backend)),
            "other" => Some(Self::Only(SkillCategory::Other)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(SkillCategory::Frontend) => "frontend",
            Self::Only(SkillCategory::Backend) => "backend",
            Self::Only(SkillCategory::Other) => "other",
        }
    }

    #[must_use]
    pub fn matches(self, category: SkillCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == category,
        }
    }
}

/// One rendered skill card.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCard<'a> {
    pub skill: &'a Skill,
    pub card: TransitionStyle,
    pub bar: BarStyle,
}

#[derive(Debug)]
pub struct SkillsSection<W: ViewportWatcher> {
    section: SingleTargetSection<W>,
    skills: Vec<Skill>,
    filter: CategoryFilter,
}

impl<W: ViewportWatcher> SkillsSection<W> {
    pub fn new(watcher: W, skills: Vec<Skill>) -> Self {
        Self::with_config(watcher, SectionKind::Skills.default_config(), skills)
    }

    pub fn with_config(watcher: W, config: RevealConfig, skills: Vec<Skill>) -> Self {
        Self {
            section: SingleTargetSection::new(SectionKind::Skills, watcher, config),
            skills,
            filter: CategoryFilter::All,
        }
    }

    pub fn mount(&mut self, handle: &W::Handle) -> Registration {
        self.section.mount(handle)
    }

    pub fn handle_event(&mut self, event: &IntersectionEvent) -> bool {
        self.section.handle_event(event)
    }

    pub fn unmount(&mut self) -> usize {
        self.section.unmount()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.section.is_visible()
    }

    /// Replace the skill list. Reveal state is untouched.
    pub fn set_skills(&mut self, skills: Vec<Skill>) {
        self.skills = skills;
    }

    /// Returns `true` if the filter changed.
    pub fn set_filter(&mut self, filter: CategoryFilter) -> bool {
        if self.filter == filter {
            return false;
        }
        debug!(section = "skills", filter = filter.name(), "category filter changed");
        self.filter = filter;
        true
    }

    #[must_use]
    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn visible_skills(&self) -> impl Iterator<Item = &Skill> {
        let filter = self.filter;
        self.skills
            .iter()
            .filter(move |skill| filter.matches(skill.category))
    }

    /// Style for the card at `index` of the filtered list.
    #[must_use]
    pub fn card_style(&self, index: usize) -> TransitionStyle {
        CARD.resolve_staggered(self.is_visible(), index, Stagger::LIST)
    }

    #[must_use]
    pub fn bar_style(&self, skill: &Skill) -> BarStyle {
        BarStyle::resolve(self.is_visible(), skill.level, BAR_DURATION_MS)
    }

    #[must_use]
    pub fn tools_style(&self) -> TransitionStyle {
        TOOLS.resolve(self.is_visible())
    }

    /// Filtered cards with their styles, in display order.
    #[must_use]
    pub fn cards(&self) -> Vec<SkillCard<'_>> {
        self.visible_skills()
            .enumerate()
            .map(|(index, skill)| SkillCard {
                skill,
                card: self.card_style(index),
                bar: self.bar_style(skill),
            })
            .collect()
    }

    #[must_use]
    pub fn section(&self) -> &SingleTargetSection<W> {
        &self.section
    }

    pub fn section_mut(&mut self) -> &mut SingleTargetSection<W> {
        &mut self.section
    }
}
