#![forbid(unsafe_code)]

//! Contact section: contact details from the left, message form from the
//! right.
//!
//! The form keeps its field values here so the host can render them from
//! Rust state. Submitting hands back the [`ContactMessage`] and clears the
//! fields; delivery is up to the host.

use folio_reveal::{RevealConfig, ViewportWatcher};
use serde::Serialize;
use tracing::{debug, info};

use crate::binding::SectionKind;
use crate::panes::{PaneLayout, TwoPaneSection};
use crate::presentation::Entrance;

pub const LAYOUT: PaneLayout = PaneLayout {
    left_slot: "info",
    left: Entrance::slide_from_left(20.0, 1000),
    right_slot: "form",
    right: Entrance::slide_from_right(20.0, 1000).delayed(300),
};

pub type ContactSection<W> = TwoPaneSection<W>;

#[must_use]
pub fn new<W: ViewportWatcher>(watcher: W) -> ContactSection<W> {
    with_config(watcher, SectionKind::Contact.default_config())
}

#[must_use]
pub fn with_config<W: ViewportWatcher>(watcher: W, config: RevealConfig) -> ContactSection<W> {
    TwoPaneSection::new(SectionKind::Contact, watcher, config, LAYOUT)
}

// ---------------------------------------------------------------------------
// Message form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Message,
}

impl FormField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

/// Why a submit was refused. The form keeps its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Required field that is empty or only whitespace.
    Missing(FormField),
    /// Email without a `local@domain` shape.
    InvalidEmail(String),
}

impl core::fmt::Display for FormError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "required field is empty: {}", field.name()),
            Self::InvalidEmail(raw) => write!(f, "invalid email address: {raw}"),
        }
    }
}

impl std::error::Error for FormError {}

/// A submitted message, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    name: String,
    email: String,
    message: String,
}

impl ContactForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Message => &self.message,
        }
    }

    /// Required fields still empty, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| self.value(*field).trim().is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Validate, hand back the message and clear every field.
    pub fn submit(&mut self) -> Result<ContactMessage, FormError> {
        if let Some(field) = self.missing_fields().first() {
            debug!(field = field.name(), "contact form incomplete");
            return Err(FormError::Missing(*field));
        }
        let email = self.email.trim();
        if !looks_like_email(email) {
            debug!("contact form email rejected");
            return Err(FormError::InvalidEmail(email.to_owned()));
        }
        let message = ContactMessage {
            name: self.name.trim().to_owned(),
            email: email.to_owned(),
            message: self.message.trim().to_owned(),
        };
        self.clear();
        info!(chars = message.message.len(), "contact message submitted");
        Ok(message)
    }

    pub fn clear(&mut self) {
        for field in FormField::ALL {
            self.slot_mut(field).clear();
        }
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Message => &mut self.message,
        }
    }
}

fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !raw.chars().any(char::is_whitespace)
}
