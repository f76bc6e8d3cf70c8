#![forbid(unsafe_code)]

//! Error types for the reveal engine.
//!
//! None of these are fatal to a page. Watcher errors switch the controller
//! into its configured degraded mode; configuration errors are reported to
//! whoever supplied the configuration.

/// Failure reported by a [`ViewportWatcher`](crate::ViewportWatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherError {
    /// The platform visibility primitive does not exist in this host.
    Unavailable(String),
    /// The primitive exists but rejected the request.
    Platform(String),
}

impl core::fmt::Display for WatcherError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "viewport watcher unavailable: {msg}"),
            Self::Platform(msg) => write!(f, "viewport watcher failed: {msg}"),
        }
    }
}

impl std::error::Error for WatcherError {}

/// Invalid reveal configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Threshold outside `[0, 1]` or not finite.
    ThresholdOutOfRange(f64),
    /// Root margin is not one to four `px`/`%` lengths.
    RootMargin(String),
    /// Malformed JSON configuration.
    Json(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ThresholdOutOfRange(value) => {
                write!(f, "threshold must be within [0, 1], got {value}")
            }
            Self::RootMargin(margin) => write!(f, "invalid root margin: {margin:?}"),
            Self::Json(msg) => write!(f, "JSON config error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
