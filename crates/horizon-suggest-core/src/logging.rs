//! Logging and debugging facilities for Horizon Suggest.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Target names for filtering each subsystem
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon Suggest uses the `tracing` crate for instrumentation. To see logs,
//! you need to install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_suggest::population=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_suggest_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_suggest_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "horizon_suggest_core::property";
    /// Re-entrancy guard target.
    pub const GUARD: &str = "horizon_suggest_core::guard";
    /// Timer system target.
    pub const TIMER: &str = "horizon_suggest_core::timer";

    /// Suggestion control target.
    pub const SUGGEST: &str = "horizon_suggest";
    /// Candidate source tracking target.
    pub const SOURCE: &str = "horizon_suggest::source";
    /// Filtering engine target.
    pub const FILTER: &str = "horizon_suggest::filter";
    /// Debounce and population target.
    pub const POPULATION: &str = "horizon_suggest::population";
    /// Selection and commit target.
    pub const SELECTION: &str = "horizon_suggest::selection";
    /// Drop-down lifecycle target.
    pub const DROP_DOWN: &str = "horizon_suggest::drop_down";
    /// Performance spans target.
    pub const PERF: &str = "horizon_suggest::perf";
}

/// A guard that keeps a tracing span entered until it is dropped.
///
/// This is useful for tracking the duration of operations such as a
/// filtering pass.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
