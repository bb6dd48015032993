//! # Engine Configuration
//!
//! Tunable constants for scheduling, resolution and highlighting.
//!
//! The thresholds here were chosen empirically for particular rendering engines, so
//! they are configuration rather than invariants. Hosts usually keep the defaults and
//! override single values from a YAML file:
//!
//! ```rust
//! use lyricsync::EngineConfig;
//!
//! let config = EngineConfig::from_yaml(r#"
//! resolve-bucket-ms: 100
//! completion-threshold: 0.98
//! "#)?;
//!
//! assert_eq!(config.resolve_bucket_ms, 100);
//! assert_eq!(config.publish_interval_ms, 50); // default kept
//! # Ok::<(), lyricsync::LyricsError>(())
//! ```

use serde::Deserialize;

use crate::error::LyricsError;
use crate::types::WritingDirection;

/// Minimum wall-clock gap between scheduler wake-ups (one display frame).
pub const FRAME_THROTTLE_MS: u64 = 16;
/// Minimum gap between "elapsed time changed" publications.
pub const PUBLISH_INTERVAL_MS: u64 = 50;
/// Default discretisation granularity of the active-line resolver.
pub const RESOLVE_BUCKET_MS: u64 = 50;
/// Words lasting this long or less are treated as instant.
pub const INSTANT_WORD_MAX_MS: u64 = 1;
/// Highlight completion threshold tuned for Android text rendering.
pub const ANDROID_COMPLETION_THRESHOLD: f64 = 0.98;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub frame_throttle_ms: u64,
    pub publish_interval_ms: u64,
    pub resolve_bucket_ms: u64,
    pub hold_through_gaps: bool,
    pub instant_word_max_ms: u64,
    pub completion_threshold: f64,
    pub rtl_languages: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_throttle_ms: FRAME_THROTTLE_MS,
            publish_interval_ms: PUBLISH_INTERVAL_MS,
            resolve_bucket_ms: RESOLVE_BUCKET_MS,
            hold_through_gaps: true,
            instant_word_max_ms: INSTANT_WORD_MAX_MS,
            completion_threshold: 1.0,
            rtl_languages: ["he", "ar", "fa", "ur"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawEngineConfig {
    frame_throttle_ms: Option<u64>,
    publish_interval_ms: Option<u64>,
    resolve_bucket_ms: Option<u64>,
    hold_through_gaps: Option<bool>,
    instant_word_max_ms: Option<u64>,
    completion_threshold: Option<f64>,
    rtl_languages: Option<Vec<String>>,
}

impl EngineConfig {
    /// Parse a YAML document. Missing keys keep their defaults; an empty document
    /// yields the default configuration.
    pub fn from_yaml(content: &str) -> Result<Self, LyricsError> {
        let raw: RawEngineConfig = if content.trim().is_empty() {
            RawEngineConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| LyricsError::Config(e.to_string()))?
        };

        let defaults = EngineConfig::default();
        let config = EngineConfig {
            frame_throttle_ms: raw.frame_throttle_ms.unwrap_or(defaults.frame_throttle_ms),
            publish_interval_ms: raw.publish_interval_ms.unwrap_or(defaults.publish_interval_ms),
            resolve_bucket_ms: raw.resolve_bucket_ms.unwrap_or(defaults.resolve_bucket_ms),
            hold_through_gaps: raw.hold_through_gaps.unwrap_or(defaults.hold_through_gaps),
            instant_word_max_ms: raw.instant_word_max_ms.unwrap_or(defaults.instant_word_max_ms),
            completion_threshold: raw.completion_threshold.unwrap_or(defaults.completion_threshold),
            rtl_languages: raw.rtl_languages.unwrap_or(defaults.rtl_languages),
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), LyricsError> {
        if self.resolve_bucket_ms == 0 {
            return Err(LyricsError::Config("resolve-bucket-ms must be at least 1".to_string()));
        }
        if !(self.completion_threshold > 0.0 && self.completion_threshold <= 1.0) {
            return Err(LyricsError::Config(format!(
                "completion-threshold must be in (0, 1], got {}",
                self.completion_threshold
            )));
        }
        Ok(())
    }

    pub fn is_rtl_language(&self, language: &str) -> bool {
        self.rtl_languages.iter().any(|l| l.eq_ignore_ascii_case(language))
    }

    /// Direction for text in `language`; unknown languages are left-to-right.
    pub fn direction_for(&self, language: Option<&str>) -> WritingDirection {
        match language {
            Some(lang) if self.is_rtl_language(lang) => WritingDirection::Rtl,
            _ => WritingDirection::Ltr,
        }
    }
}
