#![forbid(unsafe_code)]

//! Reveal state store with change notification.
//!
//! # Design
//!
//! [`RevealStore`] is a set of revealed [`TargetId`]s in shared,
//! reference-counted storage (`Rc<RefCell<..>>`). The controller writes it;
//! the rendering layer holds clones and reads it (or subscribes) to compute
//! styles. A single-target section reads it as one boolean through
//! [`RevealStore::has_revealed`].
//!
//! # Invariants
//!
//! 1. Membership is monotonic: only [`RevealStore::reset`] removes ids.
//! 2. `version` increments exactly once per call that changes state.
//! 3. Marking an id twice is a no-op (no version bump, no notification).
//! 4. Subscribers are notified in registration order, outside the borrow.
//!
//! # Failure Modes
//!
//! - **Re-entrant write**: writing to the store from a subscriber callback
//!   panics (RefCell borrow rules). A subscriber that reacts to a reveal by
//!   revealing something else is a wiring bug.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use crate::target::TargetId;

type CallbackRc = Rc<dyn Fn(&RevealChange)>;
type CallbackWeak = Weak<dyn Fn(&RevealChange)>;

/// What changed in a [`RevealStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealChange {
    /// One target revealed for the first time.
    Revealed(TargetId),
    /// Degraded mode: every id now reads as revealed.
    RevealedAll,
    /// State cleared for a full remount.
    Reset,
}

struct StoreInner {
    revealed: HashSet<TargetId>,
    reveal_all: bool,
    version: u64,
    subscribers: Vec<CallbackWeak>,
}

/// Shared, monotonic set of revealed targets.
///
/// Cloning creates another handle to the **same** state.
pub struct RevealStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl Clone for RevealStore {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for RevealStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for RevealStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RevealStore")
            .field("revealed", &inner.revealed.len())
            .field("reveal_all", &inner.reveal_all)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl RevealStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                revealed: HashSet::new(),
                reveal_all: false,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Record `id` as revealed. Returns `true` only the first time.
    pub fn mark_revealed(&self, id: TargetId) -> bool {
        let change = {
            let mut inner = self.inner.borrow_mut();
            if !inner.revealed.insert(id.clone()) {
                return false;
            }
            inner.version += 1;
            RevealChange::Revealed(id)
        };
        self.notify(&change);
        true
    }

    /// Switch to reveal-all. Returns `true` only the first time.
    pub fn reveal_all(&self) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.reveal_all {
                return false;
            }
            inner.reveal_all = true;
            inner.version += 1;
        }
        self.notify(&RevealChange::RevealedAll);
        true
    }

    /// Clear everything. Only for a full unmount/remount of the owner.
    pub fn reset(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.revealed.is_empty() && !inner.reveal_all {
                return;
            }
            inner.revealed.clear();
            inner.reveal_all = false;
            inner.version += 1;
        }
        self.notify(&RevealChange::Reset);
    }

    #[must_use]
    pub fn is_revealed(&self, id: &TargetId) -> bool {
        let inner = self.inner.borrow();
        inner.reveal_all || inner.revealed.contains(id)
    }

    /// Single-target view: anything revealed at all.
    #[must_use]
    pub fn has_revealed(&self) -> bool {
        let inner = self.inner.borrow();
        inner.reveal_all || !inner.revealed.is_empty()
    }

    #[must_use]
    pub fn is_revealing_all(&self) -> bool {
        self.inner.borrow().reveal_all
    }

    /// Number of individually revealed ids (reveal-all not counted).
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.inner.borrow().revealed.len()
    }

    /// Revealed ids, sorted for stable output.
    #[must_use]
    pub fn revealed_ids(&self) -> Vec<TargetId> {
        let mut ids: Vec<TargetId> = self.inner.borrow().revealed.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Bumps once per state change. Useful for dirty-checking in renders.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Subscribe to changes. Dropping the returned guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&RevealChange) + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription { _guard: strong }
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self, change: &RevealChange) {
        let callbacks: Vec<CallbackRc> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in &callbacks {
            cb(change);
        }
    }
}

/// RAII guard for a store subscriber.
///
/// The store only holds a `Weak` link; once this guard drops, the callback
/// is unreachable and gets pruned on the next notification.
pub struct Subscription {
    _guard: CallbackRc,
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn mark_is_idempotent() {
        let store = RevealStore::new();
        let id = TargetId::from("about");
        assert!(!store.is_revealed(&id));

        assert!(store.mark_revealed(id.clone()));
        assert!(!store.mark_revealed(id.clone()));
        assert!(store.is_revealed(&id));
        assert_eq!(store.version(), 1);
        assert_eq!(store.revealed_count(), 1);
    }

    #[test]
    fn has_revealed_single_target_view() {
        let store = RevealStore::new();
        assert!(!store.has_revealed());
        store.mark_revealed("skills".into());
        assert!(store.has_revealed());
    }

    #[test]
    fn reveal_all_covers_unknown_ids() {
        let store = RevealStore::new();
        assert!(store.reveal_all());
        assert!(!store.reveal_all());
        assert!(store.is_revealed(&TargetId::Key(99)));
        assert!(store.has_revealed());
        assert_eq!(store.revealed_count(), 0);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn reset_clears_and_notifies_once() {
        let store = RevealStore::new();
        let resets = Rc::new(Cell::new(0u32));
        let resets_clone = Rc::clone(&resets);
        let _sub = store.subscribe(move |change| {
            if *change == RevealChange::Reset {
                resets_clone.set(resets_clone.get() + 1);
            }
        });

        store.reset(); // Nothing to clear.
        assert_eq!(resets.get(), 0);

        store.mark_revealed(TargetId::Key(1));
        store.reveal_all();
        store.reset();
        assert_eq!(resets.get(), 1);
        assert!(!store.is_revealed(&TargetId::Key(1)));
        assert!(!store.is_revealing_all());
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn clones_share_state() {
        let writer = RevealStore::new();
        let reader = writer.clone();
        writer.mark_revealed("p1".into());
        assert!(reader.is_revealed(&"p1".into()));
        assert_eq!(reader.version(), 1);
    }

    #[test]
    fn subscribers_see_changes_in_order() {
        let store = RevealStore::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_a = Rc::clone(&log);
        let _a = store.subscribe(move |c| log_a.borrow_mut().push(('A', c.clone())));
        let log_b = Rc::clone(&log);
        let _b = store.subscribe(move |c| log_b.borrow_mut().push(('B', c.clone())));

        store.mark_revealed("p2".into());
        store.mark_revealed("p2".into());

        assert_eq!(
            *log.borrow(),
            vec![
                ('A', RevealChange::Revealed("p2".into())),
                ('B', RevealChange::Revealed("p2".into())),
            ]
        );
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let store = RevealStore::new();
        let hits = Rc::new(Cell::new(0u32));
        let hits_clone = Rc::clone(&hits);
        let sub = store.subscribe(move |_| hits_clone.set(hits_clone.get() + 1));
        let _other = store.subscribe(|_| {});
        assert_eq!(store.subscriber_count(), 2);

        store.mark_revealed(TargetId::Key(1));
        assert_eq!(hits.get(), 1);

        drop(sub);
        store.mark_revealed(TargetId::Key(2));
        assert_eq!(hits.get(), 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn revealed_ids_sorted() {
        let store = RevealStore::new();
        for id in ["p3", "p1", "p2"] {
            store.mark_revealed(id.into());
        }
        assert_eq!(
            store.revealed_ids(),
            vec![TargetId::from("p1"), "p2".into(), "p3".into()]
        );
    }

    #[test]
    fn debug_format() {
        let dbg = format!("{:?}", RevealStore::new());
        assert!(dbg.contains("RevealStore"));
        assert!(dbg.contains("version"));
    }
}
