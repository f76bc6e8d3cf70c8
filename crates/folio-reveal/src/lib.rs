#![forbid(unsafe_code)]

//! Reveal-on-scroll engine.
//!
//! # Role in Folio
//! `folio-reveal` owns the one piece of page behaviour every section shares:
//! watch an element, flip it to "revealed" the first time it crosses its
//! visibility threshold, then stop watching it. Section bindings
//! (`folio-sections`) decide what "revealed" looks like; the web layer
//! (`folio-web`) supplies the platform watcher.
//!
//! # Primary responsibilities
//! - **ViewportWatcher**: seam over the platform visibility primitive.
//! - **RevealStore**: shared, monotonic set of revealed target ids.
//! - **ObservationSession**: the pending targets of one mounted section.
//! - **RevealController**: the `Pending → Revealed` state machine with the
//!   trigger-once, teardown and fail-open policies.
//!
//! # Data flow
//! ```text
//! mount ─► controller.register ─► watcher.observe
//!                                      │ (async, host task queue)
//! intersection event ─► controller.handle_event
//!        ─► store.mark_revealed ─► subscribers re-render
//!        ─► watcher.unobserve (that target only)
//! unmount ─► controller.teardown ─► unobserve every pending target
//! ```
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); nothing is `Send`.

pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod store;
pub mod target;
pub mod watcher;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use config::{FailurePolicy, RevealConfig, Threshold};
pub use controller::{Registration, RevealController, SyncReport, TargetPhase};
pub use error::{ConfigError, WatcherError};
pub use session::ObservationSession;
pub use store::{RevealChange, RevealStore, Subscription};
pub use target::{TargetId, TrackedTarget};
pub use watcher::{IntersectionEvent, ViewportWatcher, WatchToken};
