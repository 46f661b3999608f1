//! Error types for the suggestion engine.

use horizon_suggest_core::{PropertyError, TimerError};

use crate::filter::FilterMode;

/// Result type alias for suggestion engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the suggestion engine.
///
/// Only configuration mistakes and invariant violations are errors. A query
/// with no matches, an empty source or a canceled hook is ordinary state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An option was given an out-of-range value.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The filter mode needs a predicate that was never supplied.
    #[error("Filter mode {0:?} is not supported for text filtering without a custom text predicate")]
    UnsupportedFilterMode(FilterMode),

    /// The item assigned as the selection is not one of the candidates.
    #[error("The selected item is not an element of the candidate source")]
    NotACandidate,

    /// A read-only property was written from outside the control.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// The debounce timer was in an unexpected state.
    #[error(transparent)]
    Timer(#[from] TimerError),

    /// A settings document could not be parsed.
    #[error("Failed to parse suggestion settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Out-of-range configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The debounce delay was negative.
    #[error("Invalid debounce delay {0}ms: the delay must not be negative")]
    NegativeDebounceDelay(i64),

    /// The maximum drop-down height was negative or not a number.
    #[error("Invalid maximum drop-down height {0}: the height must be a non-negative number")]
    InvalidMaxDropDownHeight(f64),
}

impl Error {
    /// Whether this is a configuration error, including an unsupported filter mode.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::UnsupportedFilterMode(_) | Self::Parse(_)
        )
    }

    /// Whether this reports a write that would break the control's state:
    /// a read-only property written from outside, or a selection that is not
    /// a candidate.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::Property(PropertyError::ReadOnly { .. }) | Self::NotACandidate
        )
    }
}
