#![forbid(unsafe_code)]

//! [`ViewportWatcher`] backed by the browser's `IntersectionObserver`.
//!
//! One observer is created per distinct threshold, lazily on first use, so
//! a missing `IntersectionObserver` global surfaces as
//! [`WatcherError::Unavailable`] from `observe` rather than at construction.
//! Observed elements get a `data-reveal-id` attribute that maps entries back
//! to their [`TargetId`]. Entries are queued; the owner drains them with
//! [`DomWatcher::drain_events`] and feeds the controller.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use folio_reveal::{
    IntersectionEvent, TargetId, Threshold, ViewportWatcher, WatchToken, WatcherError,
};
use js_sys::{Array, Function};
use tracing::{debug, trace};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

/// Attribute carrying the target id on observed elements.
pub const REVEAL_ID_ATTR: &str = "data-reveal-id";

type EntryCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct Observed {
    element: Element,
    observer: usize,
}

pub struct DomWatcher {
    root_margin: String,
    queue: Rc<RefCell<VecDeque<IntersectionEvent>>>,
    notify: Rc<RefCell<Option<Function>>>,
    callback: Option<EntryCallback>,
    /// Observers keyed by threshold, compared on the raw bits.
    observers: Vec<(u64, IntersectionObserver)>,
    live: HashMap<WatchToken, Observed>,
    next_token: u64,
}

impl DomWatcher {
    pub fn new(root_margin: impl Into<String>) -> Self {
        Self {
            root_margin: root_margin.into(),
            queue: Rc::new(RefCell::new(VecDeque::new())),
            notify: Rc::new(RefCell::new(None)),
            callback: None,
            observers: Vec::new(),
            live: HashMap::new(),
            next_token: 0,
        }
    }

    /// Called with no arguments after each batch of entries is queued.
    pub fn set_notify(&mut self, notify: Option<Function>) {
        *self.notify.borrow_mut() = notify;
    }

    /// Take every queued report, oldest first.
    pub fn drain_events(&self) -> Vec<IntersectionEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn entry_callback(&mut self) -> &EntryCallback {
        let queue = Rc::clone(&self.queue);
        let notify = Rc::clone(&self.notify);
        self.callback.get_or_insert_with(|| {
            Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
                let mut queued = 0usize;
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let Some(raw) = entry.target().get_attribute(REVEAL_ID_ATTR) else {
                        continue;
                    };
                    queue.borrow_mut().push_back(IntersectionEvent {
                        id: TargetId::from_attribute(&raw),
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                    });
                    queued += 1;
                }
                trace!(queued, "intersection entries queued");
                // Clone out so the callee may call back into the watcher.
                let notify = notify.borrow().clone();
                if queued > 0
                    && let Some(notify) = notify
                {
                    let _ = notify.call0(&JsValue::NULL);
                }
            }) as Box<dyn FnMut(Array, IntersectionObserver)>)
        })
    }

    fn observer_for(&mut self, threshold: Threshold) -> Result<usize, WatcherError> {
        let key = threshold.fraction().to_bits();
        if let Some(index) = self.observers.iter().position(|(bits, _)| *bits == key) {
            return Ok(index);
        }

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold.fraction()));
        init.set_root_margin(&self.root_margin);
        let callback = self.entry_callback().as_ref().unchecked_ref::<Function>().clone();
        let observer = IntersectionObserver::new_with_options(&callback, &init)
            .map_err(|err| WatcherError::Unavailable(describe(&err)))?;
        debug!(
            threshold = threshold.fraction(),
            root_margin = %self.root_margin,
            "intersection observer created"
        );
        self.observers.push((key, observer));
        Ok(self.observers.len() - 1)
    }
}

impl ViewportWatcher for DomWatcher {
    type Handle = Element;

    fn observe(
        &mut self,
        id: &TargetId,
        handle: &Element,
        threshold: Threshold,
    ) -> Result<Option<WatchToken>, WatcherError> {
        if !handle.is_connected() {
            return Ok(None);
        }
        let observer = self.observer_for(threshold)?;
        handle
            .set_attribute(REVEAL_ID_ATTR, &id.to_string())
            .map_err(|err| WatcherError::Platform(describe(&err)))?;
        self.observers[observer].1.observe(handle);

        self.next_token += 1;
        let token = WatchToken::new(self.next_token);
        self.live.insert(
            token,
            Observed {
                element: handle.clone(),
                observer,
            },
        );
        Ok(Some(token))
    }

    fn unobserve(&mut self, token: WatchToken) {
        if let Some(observed) = self.live.remove(&token)
            && let Some((_, observer)) = self.observers.get(observed.observer)
        {
            observer.unobserve(&observed.element);
        }
    }
}

impl Drop for DomWatcher {
    fn drop(&mut self) {
        for (_, observer) in &self.observers {
            observer.disconnect();
        }
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}
