#![forbid(unsafe_code)]

//! Browser frontend for the Folio reveal engine.
//!
//! Two ways to drive reveals from JavaScript:
//!
//! - [`SectionRevealer`] (wasm32 only) owns a real `IntersectionObserver`
//!   through [`dom_watcher::DomWatcher`]. The host hands it elements.
//! - `PageRunner` (wasm32, `entry-parser` feature) keeps the observers on
//!   the JavaScript side. The host reports mounts and intersection entries
//!   as JSON and drains observe/unobserve commands plus reveal notices.
//!   Its logic lives in [`runner_core::PageCore`] so it runs natively too.

#[cfg(target_arch = "wasm32")]
pub mod dom_watcher;

#[cfg(feature = "entry-parser")]
pub mod entry_parser;

pub mod host_watcher;

#[cfg(feature = "entry-parser")]
pub mod runner_core;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(all(target_arch = "wasm32", feature = "entry-parser"))]
pub use wasm::PageRunner;
#[cfg(target_arch = "wasm32")]
pub use wasm::SectionRevealer;

pub use host_watcher::{CommandFeed, HostWatcher, WatchCommand};
