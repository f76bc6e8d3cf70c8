#![forbid(unsafe_code)]

//! Section identity, id schemes and default reveal configuration.

use folio_reveal::{RevealConfig, TargetId, Threshold};
use serde::{Deserialize, Serialize};

/// The page sections that carry entrance animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Hero,
    About,
    Projects,
    Skills,
    Contact,
}

/// How a section names its tracked targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    /// One target for the whole section.
    Fixed(&'static str),
    /// One target per entity, keyed by the entity's own identifier.
    PerEntity,
}

impl IdScheme {
    #[must_use]
    pub fn fixed_id(self) -> Option<TargetId> {
        match self {
            Self::Fixed(name) => Some(TargetId::from(name)),
            Self::PerEntity => None,
        }
    }
}

/// What starts a section's entrance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// As soon as the section mounts.
    OnMount,
    /// When the target crosses its visibility threshold.
    OnIntersect,
}

impl SectionKind {
    pub const ALL: [Self; 5] = [
        Self::Hero,
        Self::About,
        Self::Projects,
        Self::Skills,
        Self::Contact,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::About => "about",
            Self::Projects => "projects",
            Self::Skills => "skills",
            Self::Contact => "contact",
        }
    }

    /// Accepts section names and the hero's `home` anchor.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hero" | "home" => Some(Self::Hero),
            "about" => Some(Self::About),
            "projects" => Some(Self::Projects),
            "skills" => Some(Self::Skills),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    /// In-page link target used by the navigation bar.
    #[must_use]
    pub const fn anchor(self) -> &'static str {
        match self {
            Self::Hero => "#home",
            Self::About => "#about",
            Self::Projects => "#projects",
            Self::Skills => "#skills",
            Self::Contact => "#contact",
        }
    }

    #[must_use]
    pub const fn id_scheme(self) -> IdScheme {
        match self {
            Self::Hero => IdScheme::Fixed("home"),
            Self::About => IdScheme::Fixed("about"),
            Self::Projects => IdScheme::PerEntity,
            Self::Skills => IdScheme::Fixed("skills"),
            Self::Contact => IdScheme::Fixed("contact"),
        }
    }

    #[must_use]
    pub const fn trigger(self) -> Trigger {
        match self {
            Self::Hero => Trigger::OnMount,
            _ => Trigger::OnIntersect,
        }
    }

    /// Project cards need a fifth of their area in view; whole sections a
    /// tenth.
    #[must_use]
    pub fn default_config(self) -> RevealConfig {
        let threshold = match self {
            Self::Projects => Threshold::clamped(0.2),
            _ => Threshold::DEFAULT,
        };
        RevealConfig::default().with_threshold(threshold)
    }
}

impl core::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
