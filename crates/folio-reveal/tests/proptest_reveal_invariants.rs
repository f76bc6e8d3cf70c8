//! Property-based invariant tests for the reveal controller.
//!
//! For arbitrary interleavings of registrations, intersection reports and a
//! teardown point:
//!
//! 1. Each target reveals at most once (one `Revealed` change per id).
//! 2. Reveal is monotonic: once revealed, always revealed.
//! 3. Each target gets at most one live observation and is unobserved at
//!    most once. Observes that hit a detached target do not count.
//! 4. Every revealed target has been unobserved.
//! 5. After teardown nothing is live and no further reveals fire.
//! 6. The terminal revealed set does not depend on event order.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use folio_reveal::testing::RecordingWatcher;
use folio_reveal::{IntersectionEvent, RevealChange, RevealConfig, RevealController, TargetId};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Step {
    Register(u8),
    Report { id: u8, intersecting: bool },
    Detach(u8),
    Attach(u8),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..8).prop_map(Step::Register),
        (0u8..8, any::<bool>()).prop_map(|(id, intersecting)| Step::Report { id, intersecting }),
        (0u8..8).prop_map(Step::Detach),
        (0u8..8).prop_map(Step::Attach),
    ]
}

fn target(id: u8) -> TargetId {
    TargetId::Key(u64::from(id))
}

// ── Properties ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn trigger_once_and_monotonic(
        steps in proptest::collection::vec(step_strategy(), 0..80),
        teardown_at in 0usize..80,
    ) {
        let mut ctl = RevealController::new(RecordingWatcher::new(), RevealConfig::default());
        let changes = Rc::new(RefCell::new(Vec::new()));
        let changes_clone = Rc::clone(&changes);
        let _sub = ctl.store().subscribe(move |c| changes_clone.borrow_mut().push(c.clone()));

        let mut seen_revealed: HashSet<TargetId> = HashSet::new();
        let mut reveals_at_teardown = None;

        for (idx, step) in steps.iter().enumerate() {
            if idx == teardown_at {
                ctl.teardown();
                reveals_at_teardown = Some(changes.borrow().len());
            }
            match step {
                Step::Register(id) => { ctl.register(target(*id), &()); }
                Step::Report { id, intersecting } => {
                    let event = IntersectionEvent {
                        id: target(*id),
                        is_intersecting: *intersecting,
                        ratio: if *intersecting { 0.5 } else { 0.0 },
                    };
                    ctl.handle_event(&event);
                }
                Step::Detach(id) => ctl.watcher_mut().detach(target(*id)),
                Step::Attach(id) => ctl.watcher_mut().attach(target(*id)),
            }

            for id in &seen_revealed {
                prop_assert!(ctl.is_revealed(id), "{id} un-revealed");
            }
            seen_revealed.extend(ctl.store().revealed_ids());
        }

        // 1. At most one change per id.
        let mut per_id: HashSet<TargetId> = HashSet::new();
        for change in changes.borrow().iter() {
            if let RevealChange::Revealed(id) = change {
                prop_assert!(per_id.insert(id.clone()), "{id} revealed twice");
            }
        }

        // 3 + 4. Observe/unobserve bookkeeping.
        for raw in 0u8..8 {
            let id = target(raw);
            let watcher = ctl.watcher();
            prop_assert!(watcher.granted_count(&id) <= 1, "{id} observed twice");
            prop_assert!(watcher.unobserve_count(&id) <= watcher.granted_count(&id));
            if ctl.is_revealed(&id) {
                prop_assert_eq!(watcher.unobserve_count(&id), 1);
                prop_assert!(!watcher.is_watching(&id));
            }
        }

        // 5. Nothing after teardown.
        if let Some(count) = reveals_at_teardown {
            prop_assert_eq!(changes.borrow().len(), count);
            prop_assert_eq!(ctl.watcher().live_count(), 0);
        }
    }

    #[test]
    fn terminal_set_independent_of_order(order in Just((0u8..8).collect::<Vec<_>>()).prop_shuffle()) {
        let mut ctl = RevealController::new(RecordingWatcher::new(), RevealConfig::default());
        ctl.sync_targets((0u8..8).map(|id| (target(id), &())));
        ctl.handle_events(order.iter().map(|id| IntersectionEvent::entering(target(*id))));

        let expected: Vec<TargetId> = (0u8..8).map(target).collect();
        prop_assert_eq!(ctl.store().revealed_ids(), expected);
        prop_assert_eq!(ctl.watcher().live_count(), 0);
    }
}
