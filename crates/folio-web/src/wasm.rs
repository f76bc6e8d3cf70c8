#![forbid(unsafe_code)]

//! `wasm-bindgen` exports. Only compiled on `wasm32` targets.

use folio_reveal::{RevealConfig, RevealController, TargetId};
use folio_sections::SectionKind;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom_watcher::DomWatcher;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

fn js_error(err: impl core::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn section_kind(name: &str) -> Result<SectionKind, JsValue> {
    SectionKind::from_name(name).ok_or_else(|| js_error(format!("unknown section: {name}")))
}

fn string_array<I, T>(items: I) -> Array
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    let arr = Array::new();
    for item in items {
        arr.push(&JsValue::from_str(&item.to_string()));
    }
    arr
}

// ---------------------------------------------------------------------------
// SectionRevealer
// ---------------------------------------------------------------------------

/// Reveal controller for one section, observing real DOM elements.
///
/// The host passes elements to `track` and calls `pump` from the `onEntries`
/// callback (or once per animation frame) to apply queued reports.
#[wasm_bindgen]
pub struct SectionRevealer {
    inner: RevealController<DomWatcher>,
}

#[wasm_bindgen]
impl SectionRevealer {
    /// `config_json` is an optional [`RevealConfig`] object whose missing
    /// fields take the global defaults. Without it the section's own
    /// defaults apply.
    #[wasm_bindgen(constructor)]
    pub fn new(section: &str, config_json: Option<String>) -> Result<SectionRevealer, JsValue> {
        install_panic_hook();
        let kind = section_kind(section)?;
        let config = match config_json {
            Some(json) => RevealConfig::from_json(&json).map_err(js_error)?,
            None => kind.default_config(),
        };
        let watcher = DomWatcher::new(config.root_margin.clone());
        Ok(Self {
            inner: RevealController::new(watcher, config).with_label(kind.name()),
        })
    }

    /// Called with no arguments whenever new entries are queued.
    #[wasm_bindgen(js_name = onEntries)]
    pub fn on_entries(&mut self, callback: Option<Function>) {
        self.inner.watcher_mut().set_notify(callback);
    }

    /// Register an element. Returns the registration outcome in snake case
    /// (`"observing"`, `"deferred"`, `"failed_open"`, ...).
    pub fn track(&mut self, element: &Element, id: &str) -> String {
        self.inner
            .register(TargetId::from_attribute(id), element)
            .as_str()
            .to_owned()
    }

    /// Apply queued intersection reports. Returns newly revealed ids.
    pub fn pump(&mut self) -> Array {
        let events = self.inner.watcher().drain_events();
        string_array(self.inner.handle_events(events))
    }

    #[wasm_bindgen(js_name = isRevealed)]
    pub fn is_revealed(&self, id: &str) -> bool {
        self.inner.is_revealed(&TargetId::from_attribute(id))
    }

    #[wasm_bindgen(js_name = hasRevealed)]
    pub fn has_revealed(&self) -> bool {
        self.inner.has_revealed()
    }

    #[wasm_bindgen(js_name = pendingCount)]
    pub fn pending_count(&self) -> usize {
        self.inner.pending_count()
    }

    /// Last watcher failure message, or `null`.
    pub fn failure(&self) -> Option<String> {
        self.inner.failure().map(ToString::to_string)
    }

    /// Unmount: release every observation. Returns how many were pending.
    pub fn destroy(&mut self) -> usize {
        self.inner.teardown()
    }

    /// Full remount: the section animates again from scratch.
    pub fn remount(&mut self) {
        self.inner.remount();
    }
}

// ---------------------------------------------------------------------------
// PageRunner
// ---------------------------------------------------------------------------

#[cfg(feature = "entry-parser")]
pub use page::PageRunner;

#[cfg(feature = "entry-parser")]
mod page {
    use wasm_bindgen::prelude::*;

    use super::{install_panic_hook, js_error, section_kind};
    use crate::entry_parser::parse_id_list;
    use folio_sections::FormField;
    use crate::runner_core::{PageConfig, PageCore};
    use folio_reveal::TargetId;

    /// Whole-page runner for hosts that own their `IntersectionObserver`s.
    ///
    /// Every call may queue observe/unobserve commands and reveal notices;
    /// drain them with `takeCommands` and `takeRevealed` (JSON strings).
    #[wasm_bindgen]
    pub struct PageRunner {
        inner: PageCore,
    }

    #[wasm_bindgen]
    impl PageRunner {
        /// `config_json` maps section names to partial reveal configs.
        #[wasm_bindgen(constructor)]
        pub fn new(config_json: Option<String>) -> Result<PageRunner, JsValue> {
            install_panic_hook();
            let config = match config_json {
                Some(json) => PageConfig::from_json(&json).map_err(js_error)?,
                None => PageConfig::default(),
            };
            Ok(Self {
                inner: PageCore::new(&config),
            })
        }

        /// `ids_json` is an array of project ids for `projects`, ignored
        /// otherwise. Returns `{ registered, deferred, unchanged }`.
        #[wasm_bindgen(js_name = mountSection)]
        pub fn mount_section(
            &mut self,
            section: &str,
            ids_json: Option<String>,
        ) -> Result<JsValue, JsValue> {
            let kind = section_kind(section)?;
            let ids: Vec<TargetId> = match ids_json {
                Some(json) => parse_id_list(&json).map_err(js_error)?,
                None => Vec::new(),
            };
            let report = self.inner.mount_section(kind, &ids);
            Ok(counts_object(&[
                ("registered", report.registered),
                ("deferred", report.deferred),
                ("unchanged", report.unchanged),
            ]))
        }

        #[wasm_bindgen(js_name = unmountSection)]
        pub fn unmount_section(&mut self, section: &str) -> Result<usize, JsValue> {
            Ok(self.inner.unmount_section(section_kind(section)?))
        }

        /// Push one entry object or an array of them. Returns
        /// `{ revealed, rejected }`; throws only on malformed JSON.
        #[wasm_bindgen(js_name = pushEntries)]
        pub fn push_entries(&mut self, json: &str) -> Result<JsValue, JsValue> {
            let batch = self.inner.push_entries(json).map_err(js_error)?;
            Ok(counts_object(&[
                ("revealed", batch.revealed),
                ("rejected", batch.rejected),
            ]))
        }

        #[wasm_bindgen(js_name = reportUnavailable)]
        pub fn report_unavailable(&mut self, reason: &str) {
            self.inner.report_unavailable(reason);
        }

        #[wasm_bindgen(js_name = takeCommands)]
        pub fn take_commands(&mut self) -> String {
            self.inner.take_commands_json()
        }

        #[wasm_bindgen(js_name = takeRevealed)]
        pub fn take_revealed(&mut self) -> String {
            self.inner.take_revealed_json()
        }

        #[wasm_bindgen(js_name = isRevealed)]
        pub fn is_revealed(&self, section: &str, id: &str) -> Result<bool, JsValue> {
            Ok(self
                .inner
                .is_revealed(section_kind(section)?, &TargetId::from_attribute(id)))
        }

        /// `[{ slot, css }]` as JSON.
        #[wasm_bindgen(js_name = sectionStyles)]
        pub fn section_styles(&self, section: &str) -> Result<String, JsValue> {
            Ok(self.inner.section_styles_json(section_kind(section)?))
        }

        #[wasm_bindgen(js_name = setSkills)]
        pub fn set_skills(&mut self, json: &str) -> Result<(), JsValue> {
            self.inner.set_skills_json(json).map_err(js_error)
        }

        #[wasm_bindgen(js_name = setSkillFilter)]
        pub fn set_skill_filter(&mut self, name: &str) -> bool {
            self.inner.set_skill_filter(name)
        }

        /// `field` is `"name"`, `"email"` or `"message"`.
        #[wasm_bindgen(js_name = setContactField)]
        pub fn set_contact_field(&mut self, field: &str, value: &str) -> Result<(), JsValue> {
            let field = FormField::from_name(field)
                .ok_or_else(|| js_error(format!("unknown form field: {field}")))?;
            self.inner.set_contact_field(field, value);
            Ok(())
        }

        /// Returns the message as JSON and clears the form, or throws when a
        /// field is missing or the email is malformed.
        #[wasm_bindgen(js_name = submitContact)]
        pub fn submit_contact(&mut self) -> Result<String, JsValue> {
            self.inner.submit_contact_json().map_err(js_error)
        }

        /// Returns `true` when the navigation bar needs re-rendering.
        #[wasm_bindgen(js_name = onScroll)]
        pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
            self.inner.on_scroll(scroll_y)
        }

        #[wasm_bindgen(js_name = isNavScrolled)]
        pub fn is_nav_scrolled(&self) -> bool {
            self.inner.nav().is_scrolled()
        }

        #[wasm_bindgen(js_name = toggleMenu)]
        pub fn toggle_menu(&mut self) -> bool {
            self.inner.toggle_menu()
        }

        /// Close the menu and return the anchor to scroll to.
        #[wasm_bindgen(js_name = followLink)]
        pub fn follow_link(&mut self, section: &str) -> Result<String, JsValue> {
            Ok(self.inner.follow_link(section_kind(section)?).to_owned())
        }

        /// Unmount every section. Returns the observations released.
        pub fn destroy(&mut self) -> usize {
            self.inner.destroy()
        }
    }

    fn counts_object(counts: &[(&str, usize)]) -> JsValue {
        let obj = js_sys::Object::new();
        for (key, value) in counts {
            let _ = js_sys::Reflect::set(
                &obj,
                &JsValue::from_str(key),
                &JsValue::from_f64(*value as f64),
            );
        }
        obj.into()
    }
}
