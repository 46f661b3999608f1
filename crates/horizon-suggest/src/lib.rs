//! Horizon Suggest - a headless autocomplete engine.
//!
//! [`SuggestBox`] is the state machine behind an autocomplete text box. It
//! knows nothing about rendering: the host forwards text edits, keys, focus
//! and timer ticks, and draws what the control's signals and accessors
//! describe.
//!
//! The pieces it is built from are usable on their own:
//!
//! - [`filter`]: the twelve built-in text predicates
//! - [`source`]: candidate collections and the control's mirror of them
//! - [`engine`]: cancelable filter passes over the candidates
//! - [`population`]: debounce scheduling
//! - [`selection`]: the selection list and its keyboard navigation
//! - [`dropdown`]: negotiated open/close of the drop-down
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_suggest::{CandidateCollection, ManualClock, SuggestBox};
//!
//! let clock = ManualClock::new();
//! let states: Arc<dyn CandidateCollection<String>> =
//!     Arc::new(vec!["Alabama".to_string(), "Alaska".to_string(), "Arizona".to_string()]);
//! let mut suggest = SuggestBox::new()
//!     .with_source(states)
//!     .with_clock(Arc::new(clock.clone()));
//! suggest.set_debounce_delay_ms(300).unwrap();
//!
//! suggest.on_text_input("Ar").unwrap();
//! assert!(suggest.view().is_empty());
//!
//! clock.advance(Duration::from_millis(300));
//! assert!(suggest.process_timers().unwrap());
//! assert_eq!(suggest.view(), ["Arizona"]);
//! ```

use std::fmt;

use static_assertions::{assert_impl_all, assert_not_impl_any};

pub mod config;
pub mod dropdown;
pub mod engine;
pub mod error;
pub mod events;
pub mod field;
pub mod filter;
pub mod population;
pub mod selection;
pub mod source;
mod suggest_box;

pub use config::SuggestBoxConfig;
pub use dropdown::{DropDownLifecycle, DropDownState, Transition};
pub use engine::{FilterEngine, PassCanceller, PassOutcome, TextFormatter};
pub use error::{ConfigError, Error, Result};
pub use events::{Key, SelectionChange, SuggestBoxSignals};
pub use filter::{FilterMode, TextPredicate};
pub use population::{PopulationController, PopulationState};
pub use selection::{AdapterResponse, ListSelectionAdapter, SelectionAdapter};
pub use source::{CandidateCollection, CandidateSource, CollectionChange, ObservableList};
pub use suggest_box::SuggestBox;

pub use horizon_suggest_core::{Clock, Decision, ManualClock, SystemClock};

/// A value that can be offered as a suggestion.
///
/// Candidates are compared by value and shown through [`fmt::Display`]
/// unless the control is given its own text formatter.
pub trait Candidate: Clone + PartialEq + fmt::Display + Send + Sync + 'static {}

impl<T> Candidate for T where T: Clone + PartialEq + fmt::Display + Send + Sync + 'static {}

assert_impl_all!(SuggestBoxConfig: Send, Sync);
assert_impl_all!(PassCanceller: Send, Sync);
assert_impl_all!(ObservableList<String>: Send, Sync);
// The control lives on the thread that drives it.
assert_not_impl_any!(SuggestBox<String>: Send, Sync);
