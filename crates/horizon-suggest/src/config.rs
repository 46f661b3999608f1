//! Serializable options for a suggestion box.
//!
//! Options that are plain values live in [`SuggestBoxConfig`] and can be
//! loaded from TOML:
//!
//! ```toml
//! debounce_delay_ms = 300
//! filter_mode = "contains"
//! max_drop_down_height = 240.0
//! is_adding_inner_content_enabled = true
//! ```
//!
//! Behavior (the text formatter, a custom predicate, the clock and the
//! selection adapter) is attached to the control with its `with_*` methods.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use horizon_suggest_core::logging::targets;

use crate::error::{ConfigError, Result};
use crate::filter::FilterMode;

/// Value options of a suggestion box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestBoxConfig {
    /// Milliseconds of input silence before a population cycle runs.
    pub debounce_delay_ms: i64,
    /// How candidates are matched against the search text.
    pub filter_mode: FilterMode,
    /// Upper bound for the drop-down's height, in logical pixels.
    pub max_drop_down_height: f64,
    /// Whether the "add new content" affordance may be shown.
    pub is_adding_inner_content_enabled: bool,
}

impl Default for SuggestBoxConfig {
    fn default() -> Self {
        Self {
            debounce_delay_ms: 0,
            filter_mode: FilterMode::default(),
            max_drop_down_height: f64::INFINITY,
            is_adding_inner_content_enabled: false,
        }
    }
}

impl SuggestBoxConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).inspect_err(|e| {
            tracing::error!(target: targets::SUGGEST, error = %e, "invalid suggestion settings");
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Check every option's range.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        validate_debounce_delay(self.debounce_delay_ms)?;
        validate_max_drop_down_height(self.max_drop_down_height)?;
        Ok(())
    }

    /// The debounce delay as a [`Duration`].
    ///
    /// Negative values, which [`validate`](Self::validate) rejects, read as zero.
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.debounce_delay_ms).unwrap_or(0))
    }
}

/// Checks a debounce delay given in milliseconds.
pub fn validate_debounce_delay(millis: i64) -> std::result::Result<Duration, ConfigError> {
    match u64::try_from(millis) {
        Ok(millis) => Ok(Duration::from_millis(millis)),
        Err(_) => {
            tracing::error!(target: targets::SUGGEST, millis, "negative debounce delay rejected");
            Err(ConfigError::NegativeDebounceDelay(millis))
        }
    }
}

/// Checks a maximum drop-down height. Infinity means unbounded.
pub fn validate_max_drop_down_height(height: f64) -> std::result::Result<f64, ConfigError> {
    if height >= 0.0 {
        Ok(height)
    } else {
        tracing::error!(target: targets::SUGGEST, height, "invalid drop-down height rejected");
        Err(ConfigError::InvalidMaxDropDownHeight(height))
    }
}
