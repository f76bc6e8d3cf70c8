#![forbid(unsafe_code)]

//! Reveal controller: the per-target `Pending → Revealed` state machine.
//!
//! One controller is instantiated per mounted section with that section's
//! [`RevealConfig`]. It owns the section's watcher and observation session
//! and writes the section's [`RevealStore`].
//!
//! # Algorithm
//!
//! 1. **Register**: ask the watcher to observe the target at the configured
//!    threshold; the target becomes `Pending`.
//! 2. **Intersect**: the first `is_intersecting == true` event for a
//!    `Pending` target marks it revealed, moves it to `Revealed` and
//!    unobserves that target only. It is never re-armed.
//! 3. **Leave**: `is_intersecting == false` events are ignored. Nothing is
//!    ever hidden again.
//! 4. **Teardown**: every still-`Pending` target is unobserved without being
//!    revealed. Later events and registrations are ignored.
//!
//! Registration is continuous: [`RevealController::sync_targets`] accepts
//! the currently rendered target set on every render pass and only registers
//! ids it has not seen (or whose earlier attempt was deferred because the
//! element was not attached yet).
//!
//! # Failure Modes
//!
//! - **Detached element**: `observe` returns `Ok(None)`; the target stays
//!   unregistered and is retried on the next sync.
//! - **Watcher unavailable**: not retried. With
//!   [`FailurePolicy::FailOpen`] the store switches to reveal-all and every
//!   target is treated as revealed; with [`FailurePolicy::FailClosed`] new
//!   targets stay `Pending` with no observation behind them.

use std::collections::{HashMap, HashSet};

use tracing::{debug, debug_span, trace, warn};

use crate::config::{FailurePolicy, RevealConfig};
use crate::error::WatcherError;
use crate::session::ObservationSession;
use crate::store::RevealStore;
use crate::target::{TargetId, TrackedTarget};
use crate::watcher::{IntersectionEvent, ViewportWatcher};

/// Lifecycle state of one registered target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPhase {
    /// Registered and waiting to intersect.
    Pending,
    /// Terminal. The watcher has been released.
    Revealed,
}

/// Outcome of [`RevealController::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Newly observed; now `Pending`.
    Observing,
    /// Already `Pending`; nothing done.
    AlreadyPending,
    /// Already `Revealed`; nothing done.
    AlreadyRevealed,
    /// Element not attached yet; retry after mount.
    Deferred,
    /// Watcher unusable; target revealed immediately.
    FailedOpen,
    /// Watcher unusable; target left hidden.
    FailedClosed,
    /// Controller already torn down.
    SessionClosed,
}

impl Registration {
    /// Whether this call created a new target entry.
    #[must_use]
    pub const fn is_new(self) -> bool {
        matches!(self, Self::Observing | Self::FailedOpen | Self::FailedClosed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Observing => "observing",
            Self::AlreadyPending => "already_pending",
            Self::AlreadyRevealed => "already_revealed",
            Self::Deferred => "deferred",
            Self::FailedOpen => "failed_open",
            Self::FailedClosed => "failed_closed",
            Self::SessionClosed => "session_closed",
        }
    }
}

/// Summary of one [`RevealController::sync_targets`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Targets registered by this pass.
    pub registered: usize,
    /// Targets skipped because they were not attached.
    pub deferred: usize,
    /// Targets already known (pending or revealed).
    pub unchanged: usize,
}

/// Trigger-once reveal state machine for one section.
pub struct RevealController<W: ViewportWatcher> {
    label: String,
    config: RevealConfig,
    watcher: W,
    store: RevealStore,
    session: ObservationSession,
    phases: HashMap<TargetId, TargetPhase>,
    deferred: HashSet<TargetId>,
    failure: Option<WatcherError>,
}

impl<W: ViewportWatcher> core::fmt::Debug for RevealController<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RevealController")
            .field("label", &self.label)
            .field("config", &self.config)
            .field("pending", &self.pending_count())
            .field("revealed", &self.revealed_count())
            .field("deferred", &self.deferred.len())
            .field("open", &self.session.is_open())
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

impl<W: ViewportWatcher> RevealController<W> {
    /// Create a controller with its own fresh store.
    pub fn new(watcher: W, config: RevealConfig) -> Self {
        Self {
            label: String::from("section"),
            config,
            watcher,
            store: RevealStore::new(),
            session: ObservationSession::new(),
            phases: HashMap::new(),
            deferred: HashSet::new(),
            failure: None,
        }
    }

    /// Name used in log records.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Write into a store the rendering layer already holds.
    #[must_use]
    pub fn with_store(mut self, store: RevealStore) -> Self {
        self.store = store;
        self
    }

    // -----------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------

    /// Register one target. Idempotent per id.
    pub fn register(&mut self, id: impl Into<TargetId>, handle: &W::Handle) -> Registration {
        let id = id.into();
        if !self.session.is_open() {
            trace!(section = %self.label, %id, "registration after teardown ignored");
            return Registration::SessionClosed;
        }
        match self.phases.get(&id) {
            Some(TargetPhase::Pending) => return Registration::AlreadyPending,
            Some(TargetPhase::Revealed) => return Registration::AlreadyRevealed,
            None => {}
        }
        if self.failure.is_some() {
            return self.register_degraded(id);
        }

        match self.watcher.observe(&id, handle, self.config.threshold) {
            Ok(Some(token)) => {
                self.deferred.remove(&id);
                self.session.insert(id.clone(), token);
                debug!(
                    section = %self.label,
                    %id,
                    threshold = self.config.threshold.fraction(),
                    "observing target"
                );
                self.phases.insert(id, TargetPhase::Pending);
                Registration::Observing
            }
            Ok(None) => {
                debug!(section = %self.label, %id, "target not attached, deferring");
                self.deferred.insert(id);
                Registration::Deferred
            }
            Err(err) => {
                self.degrade(err);
                self.register_degraded(id)
            }
        }
    }

    /// Reconcile with the currently rendered target set.
    ///
    /// Only ids never registered (or previously deferred) are passed to the
    /// watcher; everything else is counted as unchanged. Ids that vanished
    /// from the rendered set keep their state.
    ///
    /// Accepts [`TrackedTarget`]s or plain `(id, handle)` pairs.
    pub fn sync_targets<'a, I, T>(&mut self, targets: I) -> SyncReport
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackedTarget<&'a W::Handle>>,
        W::Handle: 'a,
    {
        let _span = debug_span!("reveal_sync", section = %self.label).entered();
        let mut report = SyncReport::default();
        for target in targets {
            let TrackedTarget { id, handle } = target.into();
            if self.phases.contains_key(&id) {
                report.unchanged += 1;
                continue;
            }
            match self.register(id, handle) {
                Registration::Deferred => report.deferred += 1,
                outcome if outcome.is_new() => report.registered += 1,
                _ => {}
            }
        }
        report
    }

    /// The host reports that the platform watcher is unusable (for example
    /// the observer constructor threw). Applies the failure policy now
    /// instead of at the next registration. Only the first report counts.
    pub fn report_failure(&mut self, err: WatcherError) {
        if self.failure.is_some() || !self.session.is_open() {
            return;
        }
        self.degrade(err);
    }

    fn degrade(&mut self, err: WatcherError) {
        warn!(
            section = %self.label,
            error = %err,
            policy = ?self.config.failure_policy,
            "viewport watcher failed, not retrying"
        );
        if self.config.failure_policy == FailurePolicy::FailOpen {
            self.store.reveal_all();
            for (id, token) in self.session.drain() {
                self.watcher.unobserve(token);
                self.store.mark_revealed(id.clone());
                self.phases.insert(id, TargetPhase::Revealed);
            }
        }
        self.failure = Some(err);
    }

    fn register_degraded(&mut self, id: TargetId) -> Registration {
        self.deferred.remove(&id);
        match self.config.failure_policy {
            FailurePolicy::FailOpen => {
                self.store.mark_revealed(id.clone());
                self.phases.insert(id, TargetPhase::Revealed);
                Registration::FailedOpen
            }
            FailurePolicy::FailClosed => {
                self.phases.insert(id, TargetPhase::Pending);
                Registration::FailedClosed
            }
        }
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    /// Apply one intersection report. Returns the id if this event revealed
    /// it.
    pub fn handle_event(&mut self, event: &IntersectionEvent) -> Option<TargetId> {
        if !self.session.is_open() {
            trace!(section = %self.label, id = %event.id, "event after teardown ignored");
            return None;
        }
        if !event.is_intersecting {
            return None;
        }
        let phase = self.phases.get_mut(&event.id)?;
        if *phase == TargetPhase::Revealed {
            return None;
        }
        *phase = TargetPhase::Revealed;

        if let Some(token) = self.session.release(&event.id) {
            self.watcher.unobserve(token);
        }
        self.store.mark_revealed(event.id.clone());
        debug!(
            section = %self.label,
            id = %event.id,
            ratio = event.ratio,
            "target revealed"
        );
        Some(event.id.clone())
    }

    /// Apply a batch of reports in order. Returns newly revealed ids.
    pub fn handle_events<I>(&mut self, events: I) -> Vec<TargetId>
    where
        I: IntoIterator<Item = IntersectionEvent>,
    {
        events
            .into_iter()
            .filter_map(|event| self.handle_event(&event))
            .collect()
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Unmount: release every pending observation without revealing it.
    /// Returns the number released. Subsequent calls do nothing.
    pub fn teardown(&mut self) -> usize {
        if !self.session.is_open() {
            return 0;
        }
        let released = self.session.close();
        let count = released.len();
        for (_, token) in released {
            self.watcher.unobserve(token);
        }
        self.deferred.clear();
        debug!(
            section = %self.label,
            released = count,
            revealed = self.revealed_count(),
            "observation session closed"
        );
        count
    }

    /// Full unmount and remount: teardown, then clear every target and the
    /// store. A previous watcher failure is forgotten.
    pub fn remount(&mut self) {
        self.teardown();
        self.phases.clear();
        self.failure = None;
        self.store.reset();
        self.session.reopen();
        debug!(section = %self.label, "observation session reopened");
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn phase(&self, id: &TargetId) -> Option<TargetPhase> {
        self.phases.get(id).copied()
    }

    /// Reads through the store, so fail-open covers unregistered ids too.
    #[must_use]
    pub fn is_revealed(&self, id: &TargetId) -> bool {
        self.store.is_revealed(id)
    }

    /// Single-target view of the store.
    #[must_use]
    pub fn has_revealed(&self) -> bool {
        self.store.has_revealed()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.phases
            .values()
            .filter(|phase| **phase == TargetPhase::Pending)
            .count()
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.phases.len() - self.pending_count()
    }

    /// Targets waiting for their element to attach.
    #[must_use]
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// Live observations held by the session.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.session.len()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    #[must_use]
    pub fn failure(&self) -> Option<&WatcherError> {
        self.failure.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn store(&self) -> &RevealStore {
        &self.store
    }

    #[must_use]
    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    pub fn watcher_mut(&mut self) -> &mut W {
        &mut self.watcher
    }
}

impl<W: ViewportWatcher> Drop for RevealController<W> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Threshold;
    use crate::testing::{RecordingWatcher, WatchCall};
    use pretty_assertions::assert_eq;

    fn controller() -> RevealController<RecordingWatcher> {
        RevealController::new(RecordingWatcher::new(), RevealConfig::default()).with_label("test")
    }

    #[test]
    fn register_observes_at_threshold() {
        let config = RevealConfig::default().with_threshold(Threshold::new(0.2).unwrap());
        let mut ctl = RevealController::new(RecordingWatcher::new(), config);
        assert_eq!(ctl.register("p1", &()), Registration::Observing);
        assert_eq!(
            ctl.watcher().calls(),
            &[WatchCall::Observe {
                id: "p1".into(),
                threshold: Threshold::new(0.2).unwrap(),
            }]
        );
        assert_eq!(ctl.phase(&"p1".into()), Some(TargetPhase::Pending));
    }

    #[test]
    fn duplicate_registration_is_noop() {
        let mut ctl = controller();
        ctl.register("about", &());
        assert_eq!(ctl.register("about", &()), Registration::AlreadyPending);

        ctl.handle_event(&IntersectionEvent::entering("about"));
        assert_eq!(ctl.register("about", &()), Registration::AlreadyRevealed);
        assert_eq!(ctl.watcher().observe_count(&"about".into()), 1);
    }

    #[test]
    fn reveal_releases_only_that_target() {
        let mut ctl = controller();
        ctl.register("p1", &());
        ctl.register("p2", &());

        assert_eq!(
            ctl.handle_event(&IntersectionEvent::entering("p1")),
            Some("p1".into())
        );
        assert!(!ctl.watcher().is_watching(&"p1".into()));
        assert!(ctl.watcher().is_watching(&"p2".into()));
        assert_eq!(ctl.observed_count(), 1);
    }

    #[test]
    fn repeated_events_do_nothing() {
        let mut ctl = controller();
        ctl.register("p1", &());
        ctl.handle_event(&IntersectionEvent::entering("p1"));
        let version = ctl.store().version();

        assert_eq!(ctl.handle_event(&IntersectionEvent::entering("p1")), None);
        assert_eq!(ctl.handle_event(&IntersectionEvent::leaving("p1")), None);
        assert_eq!(ctl.store().version(), version);
        assert!(ctl.is_revealed(&"p1".into()));
        assert_eq!(ctl.watcher().unobserve_count(&"p1".into()), 1);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut ctl = controller();
        assert_eq!(ctl.handle_event(&IntersectionEvent::entering("ghost")), None);
        assert!(!ctl.has_revealed());
    }

    #[test]
    fn deferred_target_retried_by_sync() {
        let mut ctl = controller();
        ctl.watcher_mut().detach("p1");
        assert_eq!(ctl.register("p1", &()), Registration::Deferred);
        assert_eq!(ctl.phase(&"p1".into()), None);
        assert_eq!(ctl.deferred_count(), 1);

        ctl.watcher_mut().attach("p1");
        let report = ctl.sync_targets([(TargetId::from("p1"), &())]);
        assert_eq!(
            report,
            SyncReport {
                registered: 1,
                deferred: 0,
                unchanged: 0
            }
        );
        assert_eq!(ctl.deferred_count(), 0);
        assert_eq!(ctl.phase(&"p1".into()), Some(TargetPhase::Pending));
    }

    #[test]
    fn teardown_releases_pending_only() {
        let mut ctl = controller();
        for id in ["p1", "p2", "p3"] {
            ctl.register(id, &());
        }
        ctl.handle_event(&IntersectionEvent::entering("p2"));

        assert_eq!(ctl.teardown(), 2);
        assert_eq!(ctl.teardown(), 0);
        assert_eq!(ctl.watcher().live_count(), 0);
        assert_eq!(ctl.store().revealed_ids(), vec![TargetId::from("p2")]);

        assert_eq!(ctl.handle_event(&IntersectionEvent::entering("p1")), None);
        assert_eq!(ctl.register("p4", &()), Registration::SessionClosed);
        assert!(!ctl.is_revealed(&"p1".into()));
    }

    #[test]
    fn fail_open_reveals_everything() {
        let mut ctl = controller();
        ctl.register("p1", &());
        ctl.watcher_mut().set_unavailable("IntersectionObserver missing");

        assert_eq!(ctl.register("p2", &()), Registration::FailedOpen);
        assert!(ctl.failure().is_some());
        assert!(ctl.store().is_revealing_all());
        assert_eq!(ctl.phase(&"p1".into()), Some(TargetPhase::Revealed));
        assert_eq!(ctl.phase(&"p2".into()), Some(TargetPhase::Revealed));
        assert_eq!(ctl.watcher().live_count(), 0);
        assert!(ctl.is_revealed(&"never-registered".into()));

        // Not retried.
        assert_eq!(ctl.register("p3", &()), Registration::FailedOpen);
        assert_eq!(ctl.watcher().observe_count(&"p3".into()), 0);
    }

    #[test]
    fn reported_failure_reveals_pending() {
        let mut ctl = controller();
        ctl.register("p1", &());
        ctl.report_failure(WatcherError::Unavailable("host says no".into()));
        ctl.report_failure(WatcherError::Platform("ignored".into()));

        assert_eq!(
            ctl.failure(),
            Some(&WatcherError::Unavailable("host says no".into()))
        );
        assert_eq!(ctl.phase(&"p1".into()), Some(TargetPhase::Revealed));
        assert_eq!(ctl.watcher().unobserve_count(&"p1".into()), 1);
        assert_eq!(ctl.register("p2", &()), Registration::FailedOpen);
    }

    #[test]
    fn fail_closed_keeps_targets_hidden() {
        let config = RevealConfig::default().with_failure_policy(FailurePolicy::FailClosed);
        let mut ctl = RevealController::new(RecordingWatcher::new(), config);
        ctl.watcher_mut().set_unavailable("nope");

        assert_eq!(ctl.register("about", &()), Registration::FailedClosed);
        assert_eq!(ctl.phase(&"about".into()), Some(TargetPhase::Pending));
        assert!(!ctl.has_revealed());
        assert_eq!(ctl.teardown(), 0);
    }

    #[test]
    fn remount_starts_fresh() {
        let mut ctl = controller();
        ctl.register("about", &());
        ctl.handle_event(&IntersectionEvent::entering("about"));
        ctl.remount();

        assert!(ctl.is_open());
        assert!(!ctl.has_revealed());
        assert_eq!(ctl.register("about", &()), Registration::Observing);
    }

    #[test]
    fn drop_tears_down() {
        let store = RevealStore::new();
        let ctl_store = store.clone();
        {
            let mut ctl = controller().with_store(ctl_store);
            ctl.register("p1", &());
            ctl.register("p2", &());
            ctl.handle_event(&IntersectionEvent::entering("p1"));
        }
        assert_eq!(store.revealed_ids(), vec![TargetId::from("p1")]);
    }

    #[test]
    fn debug_format() {
        let dbg = format!("{:?}", controller());
        assert!(dbg.contains("RevealController"));
        assert!(dbg.contains("test"));
    }
}
