//! Configuration for a single screen search

use crate::error::{MatchError, MatchResult};
use std::time::Duration;

/// Default confidence threshold used by the command-line invocation
pub const DEFAULT_CONFIDENCE: f32 = 0.8;
/// Default search timeout used by the command-line invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Fixed delay between two polling attempts
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Default minimum delay between two capture operations
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

/// Settings handed to the capture backend instead of living in global state.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyConfig {
    /// Abort when the pointer is parked in a screen corner. Off for lookups.
    pub fail_safe: bool,
    /// Minimum delay between two operations of the backend
    pub pause: Duration,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            fail_safe: false,
            pause: DEFAULT_PAUSE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Confidence threshold for template matching (0.0 to 1.0)
    pub confidence: f32,
    /// Give up after this much time without a match
    pub timeout: Duration,
    /// Sleep between unsuccessful attempts
    pub poll_interval: Duration,
    pub safety: SafetyConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            safety: SafetyConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Same defaults with a different confidence and timeout
    pub fn with_limits(confidence: f32, timeout: Duration) -> Self {
        Self {
            confidence,
            timeout,
            ..Self::default()
        }
    }

    /// Check the bounds a search relies on
    pub fn validate(&self) -> MatchResult<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(MatchError::InvalidConfig {
                description: format!("confidence {} is outside [0, 1]", self.confidence),
            });
        }
        if self.timeout.is_zero() {
            return Err(MatchError::InvalidConfig {
                description: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::default();

        assert_eq!(config.confidence, 0.8);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert!(!config.safety.fail_safe);
        assert_eq!(config.safety.pause, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        for confidence in [-0.1, 1.01, f32::NAN] {
            let config = SearchConfig::with_limits(confidence, Duration::from_secs(1));
            assert!(
                matches!(config.validate(), Err(MatchError::InvalidConfig { .. })),
                "confidence {confidence} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = SearchConfig::with_limits(0.8, Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(MatchError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_boundary_confidence_is_valid() {
        assert!(SearchConfig::with_limits(0.0, DEFAULT_TIMEOUT).validate().is_ok());
        assert!(SearchConfig::with_limits(1.0, DEFAULT_TIMEOUT).validate().is_ok());
    }
}
