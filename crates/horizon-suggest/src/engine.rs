//! The filtering engine behind the suggestion list.
//!
//! [`FilterEngine`] owns the filtered view: the ordered subset of the raw
//! candidates that matched the last completed filter pass. A pass evaluates
//! `predicate(query, format(candidate))` for every candidate in source order.
//!
//! # Cancellation
//!
//! Every pass takes a fresh generation number from a shared counter and polls
//! it before each candidate. Bumping the counter through a
//! [`PassCanceller`] (or starting another pass) makes the running pass stop at
//! the next candidate and discard what it collected. Only a pass that runs to
//! the end replaces the view, so the view never mixes results from two
//! queries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use horizon_suggest_core::logging::targets;
use horizon_suggest_core::PerfSpan;

use crate::error::{Error, Result};
use crate::filter::{FilterMode, TextPredicate};

/// Converts a candidate into the text it is displayed and matched as.
pub type TextFormatter<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// How a filter pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass ran to the end and its results are now the view.
    Completed,
    /// A newer pass was requested; nothing was committed.
    Superseded,
}

/// A handle that abandons whichever filter pass is currently running.
///
/// The handle is `Send + Sync`, so it can be captured by a predicate or
/// handed to another thread.
#[derive(Debug, Clone)]
pub struct PassCanceller {
    generation: Arc<AtomicU64>,
}

impl PassCanceller {
    /// Supersede the in-flight pass, if any.
    pub fn cancel(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(target: targets::FILTER, generation, "filter pass canceled");
    }
}

/// Owner of the filtered view.
pub struct FilterEngine<T> {
    view: Arc<[T]>,
    generation: Arc<AtomicU64>,
}

impl<T: Clone + PartialEq> FilterEngine<T> {
    /// Creates an engine with an empty view.
    pub fn new() -> Self {
        Self {
            view: Arc::from(Vec::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The current view, in source order.
    pub fn view(&self) -> &[T] {
        &self.view
    }

    /// A shared read-only copy of the current view.
    pub fn snapshot(&self) -> Arc<[T]> {
        Arc::clone(&self.view)
    }

    /// Number of candidates in the view.
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Returns `true` if nothing is in the view.
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// A handle for canceling passes from outside the engine.
    pub fn canceller(&self) -> PassCanceller {
        PassCanceller {
            generation: Arc::clone(&self.generation),
        }
    }

    /// Run a filter pass over `raw` and, if it completes, make the result the
    /// view.
    ///
    /// With [`FilterMode::None`] every candidate passes. Any other mode needs
    /// a predicate; without one the pass fails with
    /// [`Error::UnsupportedFilterMode`] and the view is left as it was.
    pub fn refresh(
        &mut self,
        raw: &[T],
        query: Option<&str>,
        mode: FilterMode,
        predicate: Option<&TextPredicate>,
        formatter: &TextFormatter<T>,
    ) -> Result<PassOutcome> {
        let predicate = match (mode, predicate) {
            (FilterMode::None, _) => None,
            (_, Some(predicate)) => Some(predicate),
            (mode, None) => {
                tracing::error!(
                    target: targets::FILTER,
                    ?mode,
                    "filter mode has no text predicate"
                );
                return Err(Error::UnsupportedFilterMode(mode));
            }
        };

        let _span = PerfSpan::new("filter_pass");
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut matched = Vec::new();

        for candidate in raw {
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(
                    target: targets::FILTER,
                    generation,
                    evaluated = matched.len(),
                    "filter pass superseded, discarding partial results"
                );
                return Ok(PassOutcome::Superseded);
            }

            let passes = match predicate {
                Some(predicate) => predicate(query, Some(formatter(candidate).as_str())),
                None => true,
            };
            if passes {
                matched.push(candidate.clone());
            }
        }

        // A cancel issued while the last candidate was evaluated still counts.
        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(PassOutcome::Superseded);
        }

        tracing::debug!(
            target: targets::FILTER,
            generation,
            query,
            candidates = raw.len(),
            matched = matched.len(),
            "filter pass completed"
        );
        self.view = Arc::from(matched);
        Ok(PassOutcome::Completed)
    }

    /// The first candidate in the view that matches `query`.
    pub fn find(
        &self,
        query: Option<&str>,
        predicate: &TextPredicate,
        formatter: &TextFormatter<T>,
    ) -> Option<T> {
        self.view
            .iter()
            .find(|candidate| predicate(query, Some(formatter(candidate).as_str())))
            .cloned()
    }

    /// Replace the view with a host-built list.
    pub fn replace_view(&mut self, items: Vec<T>) {
        self.canceller().cancel();
        self.view = Arc::from(items);
    }

    /// Drop the given candidates from the view.
    pub fn remove_items(&mut self, items: &[T]) {
        if items.is_empty() || !self.view.iter().any(|c| items.contains(c)) {
            return;
        }
        let kept: Vec<T> = self
            .view
            .iter()
            .filter(|c| !items.contains(c))
            .cloned()
            .collect();
        self.view = Arc::from(kept);
    }

    /// Empty the view.
    pub fn clear(&mut self) {
        self.view = Arc::from(Vec::new());
    }
}

impl<T: Clone + PartialEq> Default for FilterEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{self, predicate};
    use parking_lot::Mutex;

    fn states() -> Vec<String> {
        ["Alabama", "Alaska", "Arizona", "Arkansas"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn display() -> TextFormatter<String> {
        Arc::new(|s: &String| s.clone())
    }

    #[test]
    fn test_starts_with_keeps_source_order() {
        let mut engine = FilterEngine::new();
        let pred = predicate(FilterMode::StartsWith).unwrap();

        let outcome = engine
            .refresh(&states(), Some("al"), FilterMode::StartsWith, Some(&pred), &display())
            .unwrap();

        assert_eq!(outcome, PassOutcome::Completed);
        assert_eq!(engine.view(), ["Alabama", "Alaska"]);
    }

    #[test]
    fn test_mode_none_passes_everything() {
        let mut engine = FilterEngine::new();
        let pred = predicate(FilterMode::Equals).unwrap();

        engine
            .refresh(&states(), Some("zzz"), FilterMode::None, Some(&pred), &display())
            .unwrap();
        assert_eq!(engine.len(), 4);
    }

    #[test]
    fn test_custom_without_predicate_leaves_view_intact() {
        let mut engine = FilterEngine::new();
        let pred = predicate(FilterMode::Contains).unwrap();
        engine
            .refresh(&states(), Some("kan"), FilterMode::Contains, Some(&pred), &display())
            .unwrap();

        let err = engine
            .refresh(&states(), Some("a"), FilterMode::Custom, None, &display())
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedFilterMode(FilterMode::Custom)));
        assert_eq!(engine.view(), ["Arkansas"]);
    }

    #[test]
    fn test_formatter_is_applied() {
        let mut engine = FilterEngine::new();
        let pred = predicate(FilterMode::StartsWithOrdinalCaseSensitive).unwrap();
        let formatter: TextFormatter<u32> = Arc::new(|n: &u32| format!("#{n}"));

        engine
            .refresh(
                &[1, 12, 21, 123],
                Some("#12"),
                FilterMode::StartsWithOrdinalCaseSensitive,
                Some(&pred),
                &formatter,
            )
            .unwrap();
        assert_eq!(engine.view(), [12, 123]);
    }

    #[test]
    fn test_canceled_pass_commits_nothing() {
        let mut engine = FilterEngine::new();
        let canceller = engine.canceller();
        let evaluated = Arc::new(Mutex::new(0));

        let evaluated_clone = evaluated.clone();
        let canceling: TextPredicate = Arc::new(move |query: Option<&str>, text: Option<&str>| {
            let mut count = evaluated_clone.lock();
            *count += 1;
            if *count == 2 {
                canceller.cancel();
            }
            filter::starts_with(query, text)
        });

        let outcome = engine
            .refresh(&states(), Some("a"), FilterMode::Custom, Some(&canceling), &display())
            .unwrap();

        assert_eq!(outcome, PassOutcome::Superseded);
        assert_eq!(*evaluated.lock(), 2);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_find_returns_first_match() {
        let mut engine = FilterEngine::new();
        engine.replace_view(states());
        let exact = predicate(FilterMode::EqualsCaseSensitive).unwrap();

        assert_eq!(
            engine.find(Some("Alaska"), &exact, &display()),
            Some("Alaska".to_string())
        );
        assert_eq!(engine.find(Some("alaska"), &exact, &display()), None);
    }

    #[test]
    fn test_remove_items() {
        let mut engine = FilterEngine::new();
        engine.replace_view(states());
        engine.remove_items(&["Alaska".to_string(), "Texas".to_string()]);
        assert_eq!(engine.view(), ["Alabama", "Arizona", "Arkansas"]);

        engine.clear();
        assert!(engine.is_empty());
    }

    #[test]
    fn test_snapshot_is_stable_across_refresh() {
        let mut engine = FilterEngine::new();
        let pred = predicate(FilterMode::StartsWith).unwrap();
        engine
            .refresh(&states(), Some("al"), FilterMode::StartsWith, Some(&pred), &display())
            .unwrap();
        let before = engine.snapshot();

        engine
            .refresh(&states(), Some("ar"), FilterMode::StartsWith, Some(&pred), &display())
            .unwrap();
        assert_eq!(&*before, ["Alabama", "Alaska"]);
        assert_eq!(engine.view(), ["Arizona", "Arkansas"]);
    }
}
