#![forbid(unsafe_code)]

//! Platform-independent page runner.
//!
//! [`PageCore`] owns every section of the page, each driven by a
//! [`HostWatcher`] that shares one [`CommandFeed`]. The JavaScript host
//! tells it which sections mounted, forwards intersection entries, and
//! drains the resulting observe/unobserve commands and reveal notices.
//! No JS/WASM types here, so the whole flow runs under native tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use folio_reveal::{
    ConfigError, FailurePolicy, Registration, RevealChange, RevealConfig, RevealController,
    Subscription, SyncReport, TargetId, Threshold, WatcherError,
};
use folio_sections::{
    AboutSection, CategoryFilter, ContactForm, ContactMessage, ContactSection, FormError,
    FormField, HeroSection, NavState, ProjectsSection, SectionKind, Skill, SkillsSection,
    TwoPaneSection, about, contact,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::entry_parser::{self, EntryParseError, SectionEntry};
use crate::host_watcher::{CommandFeed, HostWatcher, WatchCommand};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Partial [`RevealConfig`] layered over a section's defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionOverride {
    pub threshold: Option<Threshold>,
    pub root_margin: Option<String>,
    pub failure_policy: Option<FailurePolicy>,
}

impl SectionOverride {
    #[must_use]
    pub fn apply(&self, mut base: RevealConfig) -> RevealConfig {
        if let Some(threshold) = self.threshold {
            base.threshold = threshold;
        }
        if let Some(margin) = &self.root_margin {
            base.root_margin = margin.clone();
        }
        if let Some(policy) = self.failure_policy {
            base.failure_policy = policy;
        }
        base
    }
}

/// Per-section overrides, keyed by section name in JSON:
///
/// ```json
/// {"projects": {"threshold": 0.3}, "contact": {"failure_policy": "fail_closed"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageConfig {
    overrides: BTreeMap<SectionKind, SectionOverride>,
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, SectionOverride> =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        let mut config = Self::default();
        for (name, section_override) in raw {
            let kind = SectionKind::from_name(&name)
                .ok_or_else(|| ConfigError::Json(format!("unknown section: {name}")))?;
            config = config.with_override(kind, section_override);
        }
        for kind in SectionKind::ALL {
            config.config_for(kind).validate()?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_override(mut self, kind: SectionKind, section_override: SectionOverride) -> Self {
        self.overrides.insert(kind, section_override);
        self
    }

    /// Effective configuration for `kind`.
    #[must_use]
    pub fn config_for(&self, kind: SectionKind) -> RevealConfig {
        let base = kind.default_config();
        match self.overrides.get(&kind) {
            Some(section_override) => section_override.apply(base),
            None => base,
        }
    }
}

// ---------------------------------------------------------------------------
// Host-facing records
// ---------------------------------------------------------------------------

/// A reveal the host should apply. `id: None` means every target in the
/// section (degraded mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealNotice {
    pub section: SectionKind,
    pub id: Option<TargetId>,
}

/// Outcome of one [`PageCore::push_entries`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntryBatch {
    /// Targets revealed by the valid entries.
    pub revealed: usize,
    /// Items dropped because they could not be parsed.
    pub rejected: usize,
}

/// Inline CSS for one named slot of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStyle {
    pub slot: String,
    pub css: String,
}

impl SlotStyle {
    fn new(slot: impl Into<String>, css: String) -> Self {
        Self {
            slot: slot.into(),
            css,
        }
    }
}

// ---------------------------------------------------------------------------
// PageCore
// ---------------------------------------------------------------------------

pub struct PageCore {
    feed: CommandFeed,
    notices: Rc<RefCell<Vec<RevealNotice>>>,
    _subscriptions: Vec<Subscription>,
    hero: HeroSection,
    hero_unmounted: bool,
    about: AboutSection<HostWatcher>,
    projects: ProjectsSection<HostWatcher>,
    skills: SkillsSection<HostWatcher>,
    contact: ContactSection<HostWatcher>,
    contact_form: ContactForm,
    nav: NavState,
}

impl PageCore {
    #[must_use]
    pub fn new(config: &PageConfig) -> Self {
        let feed = CommandFeed::new();
        let watcher = |kind: SectionKind| {
            HostWatcher::new(kind, feed.clone(), config.config_for(kind).root_margin)
        };

        let about = about::with_config(
            watcher(SectionKind::About),
            config.config_for(SectionKind::About),
        );
        let projects = ProjectsSection::with_config(
            watcher(SectionKind::Projects),
            config.config_for(SectionKind::Projects),
        );
        let skills = SkillsSection::with_config(
            watcher(SectionKind::Skills),
            config.config_for(SectionKind::Skills),
            Vec::new(),
        );
        let contact = contact::with_config(
            watcher(SectionKind::Contact),
            config.config_for(SectionKind::Contact),
        );
        let hero = HeroSection::new();

        let notices = Rc::new(RefCell::new(Vec::new()));
        let stores = [
            (SectionKind::Hero, hero.store()),
            (SectionKind::About, about.section().controller().store()),
            (SectionKind::Projects, projects.controller().store()),
            (SectionKind::Skills, skills.section().controller().store()),
            (SectionKind::Contact, contact.section().controller().store()),
        ];
        let subscriptions = stores
            .into_iter()
            .map(|(section, store)| {
                let notices = Rc::clone(&notices);
                store.subscribe(move |change| {
                    let id = match change {
                        RevealChange::Revealed(id) => Some(id.clone()),
                        RevealChange::RevealedAll => None,
                        RevealChange::Reset => return,
                    };
                    notices.borrow_mut().push(RevealNotice { section, id });
                })
            })
            .collect();

        info!("page runner created");
        Self {
            feed,
            notices,
            _subscriptions: subscriptions,
            hero,
            hero_unmounted: false,
            about,
            projects,
            skills,
            contact,
            contact_form: ContactForm::new(),
            nav: NavState::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        PageConfig::from_json(json).map(|config| Self::new(&config))
    }

    /// The host attached a section's elements. `ids` lists project cards in
    /// display order and is ignored for single-target sections.
    pub fn mount_section(&mut self, kind: SectionKind, ids: &[TargetId]) -> SyncReport {
        debug!(section = kind.name(), ids = ids.len(), "mount section");
        if kind == SectionKind::Hero {
            let revealed = if self.hero_unmounted {
                self.hero_unmounted = false;
                self.hero.remount()
            } else {
                self.hero.mount()
            };
            return SyncReport {
                registered: usize::from(revealed),
                deferred: 0,
                unchanged: usize::from(!revealed),
            };
        }

        if let Some(controller) = self.controller_mut(kind) {
            if !controller.is_open() {
                controller.remount();
            }
            let mounted = match kind.id_scheme().fixed_id() {
                Some(id) => vec![id],
                None => ids.to_vec(),
            };
            controller.watcher_mut().mark_mounted(mounted);
        }

        match kind {
            SectionKind::Hero => SyncReport::default(),
            SectionKind::About => single_report(self.about.mount(&())),
            SectionKind::Projects => self.projects.sync(ids.iter().cloned().map(|id| (id, &()))),
            SectionKind::Skills => single_report(self.skills.mount(&())),
            SectionKind::Contact => single_report(self.contact.mount(&())),
        }
    }

    /// The host removed a section. Returns the number of observations
    /// released.
    pub fn unmount_section(&mut self, kind: SectionKind) -> usize {
        debug!(section = kind.name(), "unmount section");
        let released = match kind {
            SectionKind::Hero => {
                self.hero_unmounted = true;
                0
            }
            SectionKind::About => self.about.unmount(),
            SectionKind::Projects => self.projects.unmount(),
            SectionKind::Skills => self.skills.unmount(),
            SectionKind::Contact => self.contact.unmount(),
        };
        if let Some(controller) = self.controller_mut(kind) {
            controller.watcher_mut().clear_mounted();
        }
        released
    }

    /// Unmount every section. Returns the total observations released.
    pub fn destroy(&mut self) -> usize {
        SectionKind::ALL
            .into_iter()
            .map(|kind| self.unmount_section(kind))
            .sum()
    }

    /// Feed JSON-encoded intersection entries.
    ///
    /// Fails only when the payload is not JSON. Items that do not parse
    /// are logged and counted in [`EntryBatch::rejected`]; the rest of the
    /// batch still applies.
    pub fn push_entries(&mut self, json: &str) -> Result<EntryBatch, EntryParseError> {
        let parsed = entry_parser::parse_entries(json)?;
        for err in &parsed.rejected {
            warn!(%err, "dropping malformed intersection entry");
        }
        let revealed = parsed
            .entries
            .iter()
            .filter(|entry| self.route(entry))
            .count();
        Ok(EntryBatch {
            revealed,
            rejected: parsed.rejected.len(),
        })
    }

    /// Like [`push_entries`](Self::push_entries), but a malformed payload
    /// is logged and dropped. Returns the number of targets revealed.
    pub fn push_encoded_entries(&mut self, json: &str) -> usize {
        match self.push_entries(json) {
            Ok(batch) => batch.revealed,
            Err(err) => {
                warn!(%err, "dropping malformed intersection entries");
                0
            }
        }
    }

    fn route(&mut self, entry: &SectionEntry) -> bool {
        let event = &entry.event;
        match entry.section {
            SectionKind::Hero => false,
            SectionKind::About => self.about.handle_event(event),
            SectionKind::Projects => self.projects.handle_event(event).is_some(),
            SectionKind::Skills => self.skills.handle_event(event),
            SectionKind::Contact => self.contact.handle_event(event),
        }
    }

    /// The host could not create an observer. Every section applies its
    /// failure policy now and for later registrations.
    pub fn report_unavailable(&mut self, reason: &str) {
        warn!(reason, "host reports viewport watcher unavailable");
        for controller in self.controllers_mut() {
            controller.watcher_mut().set_unavailable(reason);
            controller.report_failure(WatcherError::Unavailable(reason.to_owned()));
        }
    }

    pub fn take_commands(&mut self) -> Vec<WatchCommand> {
        self.feed.take()
    }

    pub fn take_commands_json(&mut self) -> String {
        to_json(&self.take_commands())
    }

    pub fn take_revealed(&mut self) -> Vec<RevealNotice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }

    pub fn take_revealed_json(&mut self) -> String {
        to_json(&self.take_revealed())
    }

    #[must_use]
    pub fn is_revealed(&self, kind: SectionKind, id: &TargetId) -> bool {
        match kind {
            SectionKind::Hero => self.hero.is_visible(),
            SectionKind::About => self.about.section().controller().is_revealed(id),
            SectionKind::Projects => self.projects.is_revealed(id),
            SectionKind::Skills => self.skills.section().controller().is_revealed(id),
            SectionKind::Contact => self.contact.section().controller().is_revealed(id),
        }
    }

    /// Current inline styles for every animated slot of `kind`.
    #[must_use]
    pub fn section_styles(&self, kind: SectionKind) -> Vec<SlotStyle> {
        match kind {
            SectionKind::Hero => vec![
                SlotStyle::new("intro", self.hero.intro_style().to_css()),
                SlotStyle::new("visual", self.hero.visual_style().to_css()),
            ],
            SectionKind::About => pane_styles(&self.about),
            SectionKind::Contact => pane_styles(&self.contact),
            SectionKind::Projects => self
                .projects
                .card_styles()
                .into_iter()
                .map(|(id, style)| SlotStyle::new(id.to_string(), style.to_css()))
                .collect(),
            SectionKind::Skills => {
                let mut styles: Vec<SlotStyle> = self
                    .skills
                    .cards()
                    .into_iter()
                    .flat_map(|card| {
                        [
                            SlotStyle::new(format!("card:{}", card.skill.name), card.card.to_css()),
                            SlotStyle::new(format!("bar:{}", card.skill.name), card.bar.to_css()),
                        ]
                    })
                    .collect();
                styles.push(SlotStyle::new("tools", self.skills.tools_style().to_css()));
                styles
            }
        }
    }

    #[must_use]
    pub fn section_styles_json(&self, kind: SectionKind) -> String {
        to_json(&self.section_styles(kind))
    }

    pub fn set_skills(&mut self, skills: Vec<Skill>) {
        self.skills.set_skills(skills);
    }

    pub fn set_skills_json(&mut self, json: &str) -> Result<(), EntryParseError> {
        let skills: Vec<Skill> =
            serde_json::from_str(json).map_err(|e| EntryParseError::Json(e.to_string()))?;
        self.set_skills(skills);
        Ok(())
    }

    /// Returns `true` if the filter changed; unknown names are ignored.
    pub fn set_skill_filter(&mut self, name: &str) -> bool {
        match CategoryFilter::from_name(name) {
            Some(filter) => self.skills.set_filter(filter),
            None => false,
        }
    }

    pub fn set_contact_field(&mut self, field: FormField, value: &str) {
        self.contact_form.set(field, value);
    }

    #[must_use]
    pub fn contact_form(&self) -> &ContactForm {
        &self.contact_form
    }

    /// Submit the contact form. On success the fields are cleared and the
    /// message is handed back for the host to deliver.
    pub fn submit_contact(&mut self) -> Result<ContactMessage, FormError> {
        self.contact_form.submit()
    }

    pub fn submit_contact_json(&mut self) -> Result<String, FormError> {
        self.submit_contact().map(|message| to_json(&message))
    }

    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        self.nav.on_scroll(scroll_y)
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.nav.toggle_menu()
    }

    pub fn follow_link(&mut self, kind: SectionKind) -> &'static str {
        self.nav.follow(kind)
    }

    #[must_use]
    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    #[must_use]
    pub fn controller(&self, kind: SectionKind) -> Option<&RevealController<HostWatcher>> {
        match kind {
            SectionKind::Hero => None,
            SectionKind::About => Some(self.about.section().controller()),
            SectionKind::Projects => Some(self.projects.controller()),
            SectionKind::Skills => Some(self.skills.section().controller()),
            SectionKind::Contact => Some(self.contact.section().controller()),
        }
    }

    fn controller_mut(&mut self, kind: SectionKind) -> Option<&mut RevealController<HostWatcher>> {
        match kind {
            SectionKind::Hero => None,
            SectionKind::About => Some(self.about.section_mut().controller_mut()),
            SectionKind::Projects => Some(self.projects.controller_mut()),
            SectionKind::Skills => Some(self.skills.section_mut().controller_mut()),
            SectionKind::Contact => Some(self.contact.section_mut().controller_mut()),
        }
    }

    fn controllers_mut(&mut self) -> [&mut RevealController<HostWatcher>; 4] {
        [
            self.about.section_mut().controller_mut(),
            self.projects.controller_mut(),
            self.skills.section_mut().controller_mut(),
            self.contact.section_mut().controller_mut(),
        ]
    }
}

fn single_report(registration: Registration) -> SyncReport {
    let mut report = SyncReport::default();
    if registration.is_new() {
        report.registered = 1;
    } else if registration == Registration::Deferred {
        report.deferred = 1;
    } else {
        report.unchanged = 1;
    }
    report
}

fn pane_styles(section: &TwoPaneSection<HostWatcher>) -> Vec<SlotStyle> {
    section
        .slot_styles()
        .into_iter()
        .map(|(slot, style)| SlotStyle::new(slot, style.to_css()))
        .collect()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        warn!(%err, "serialization failed");
        "[]".to_owned()
    })
}
