#![forbid(unsafe_code)]

//! Per-section reveal configuration.
//!
//! # Design
//!
//! - [`Threshold`] is the visible-area fraction a target must reach before it
//!   counts as in view. Validated on construction so a controller never holds
//!   an out-of-range value.
//! - [`FailurePolicy`] decides what happens when the platform watcher is
//!   unavailable.
//! - [`RevealConfig`] bundles both with the observer root margin. Sections
//!   ship their own defaults; a host may override them from JSON.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// Visible-area fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Threshold used by most sections.
    pub const DEFAULT: Self = Self(0.1);

    /// Validate a fraction.
    pub fn new(fraction: f64) -> Result<Self, ConfigError> {
        if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(ConfigError::ThresholdOutOfRange(fraction))
        }
    }

    /// Clamp into range. NaN falls back to [`Threshold::DEFAULT`].
    #[must_use]
    pub fn clamped(fraction: f64) -> Self {
        if fraction.is_nan() {
            Self::DEFAULT
        } else {
            Self(fraction.clamp(0.0, 1.0))
        }
    }

    #[must_use]
    pub const fn fraction(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Threshold {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

// ---------------------------------------------------------------------------
// Failure policy
// ---------------------------------------------------------------------------

/// Behaviour when the viewport watcher reports an error.
///
/// Errors are never retried either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Treat every target as revealed; content shows without animation.
    #[default]
    FailOpen,
    /// Leave unrevealed targets hidden.
    FailClosed,
}

// ---------------------------------------------------------------------------
// RevealConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for one section's reveal controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Visible fraction required to reveal.
    pub threshold: Threshold,

    /// Margin around the viewport used when computing intersections, in
    /// CSS margin syntax (`"0px"`, `"0px 0px -10% 0px"`).
    pub root_margin: String,

    /// Degraded mode when the watcher is unavailable.
    pub failure_policy: FailurePolicy,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::DEFAULT,
            root_margin: "0px".to_owned(),
            failure_policy: FailurePolicy::FailOpen,
        }
    }
}

impl RevealConfig {
    #[must_use]
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_root_margin(mut self, margin: impl Into<String>) -> Self {
        self.root_margin = margin.into();
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check fields the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parts: Vec<&str> = self.root_margin.split_whitespace().collect();
        if parts.is_empty() || parts.len() > 4 || !parts.iter().all(|p| is_margin_length(p)) {
            return Err(ConfigError::RootMargin(self.root_margin.clone()));
        }
        Ok(())
    }
}

fn is_margin_length(token: &str) -> bool {
    let number = token
        .strip_suffix("px")
        .or_else(|| token.strip_suffix('%'))
        .unwrap_or(token);
    // A bare `0` is a valid CSS length.
    if number.len() == token.len() {
        return token == "0";
    }
    !number.is_empty() && number.parse::<f64>().is_ok_and(f64::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn threshold_validation() {
        assert_eq!(Threshold::new(0.2).map(Threshold::fraction), Ok(0.2));
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(1.0).is_ok());
        assert_eq!(
            Threshold::new(1.01),
            Err(ConfigError::ThresholdOutOfRange(1.01))
        );
        assert!(Threshold::new(f64::NAN).is_err());
        assert!(Threshold::new(-0.1).is_err());
    }

    #[test]
    fn threshold_clamping() {
        assert_eq!(Threshold::clamped(3.0).fraction(), 1.0);
        assert_eq!(Threshold::clamped(-3.0).fraction(), 0.0);
        assert_eq!(Threshold::clamped(f64::NAN), Threshold::DEFAULT);
    }

    #[test]
    fn default_config() {
        let config = RevealConfig::default();
        assert_eq!(config.threshold.fraction(), 0.1);
        assert_eq!(config.root_margin, "0px");
        assert_eq!(config.failure_policy, FailurePolicy::FailOpen);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_partial_override() {
        let config = RevealConfig::from_json(r#"{"threshold":0.2}"#).unwrap();
        assert_eq!(config.threshold.fraction(), 0.2);
        assert_eq!(config.root_margin, "0px");

        let config =
            RevealConfig::from_json(r#"{"failure_policy":"fail_closed","root_margin":"0px 0px -10% 0px"}"#)
                .unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::FailClosed);
    }

    #[test]
    fn json_rejects_bad_values() {
        assert!(matches!(
            RevealConfig::from_json(r#"{"threshold":2.0}"#),
            Err(ConfigError::Json(_))
        ));
        assert_eq!(
            RevealConfig::from_json(r#"{"root_margin":"10em"}"#),
            Err(ConfigError::RootMargin("10em".into()))
        );
        assert!(matches!(
            RevealConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn root_margin_forms() {
        for ok in ["0", "0px", "10px 5%", "-20px 0px 0px 0px", "1.5px"] {
            assert!(
                RevealConfig::default().with_root_margin(ok).validate().is_ok(),
                "{ok}"
            );
        }
        for bad in ["", "px", "1 2", "1px 2px 3px 4px 5px", "abc%"] {
            assert!(
                RevealConfig::default().with_root_margin(bad).validate().is_err(),
                "{bad}"
            );
        }
    }
}
