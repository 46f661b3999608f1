//! The suggestion box control.
//!
//! [`SuggestBox`] is a headless autocomplete text box: it owns the display
//! text, the candidate cache, the filtered view, the selected item and the
//! drop-down state, and reports every change through [`SuggestBoxSignals`].
//! The host feeds it input events (`on_text_input`, `on_key`,
//! `on_focus_changed`, ...) and renders whatever the signals and accessors
//! describe.
//!
//! # Population cycle
//!
//! Each text update restarts the debounce. When it elapses (the host calls
//! [`SuggestBox::process_timers`]) the control snapshots the display text as
//! the search text, emits `populating`, filters the candidates, emits
//! `populated`, opens the drop-down if the user typed and something matched,
//! and finally looks for an exact match to select.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_suggest::{CandidateCollection, Key, SuggestBox};
//!
//! let states: Arc<dyn CandidateCollection<String>> = Arc::new(vec![
//!     "Alabama".to_string(),
//!     "Alaska".to_string(),
//!     "Arizona".to_string(),
//! ]);
//! let mut suggest = SuggestBox::new().with_source(states);
//!
//! suggest.on_text_input("Al").unwrap();
//! assert_eq!(suggest.view(), ["Alabama", "Alaska"]);
//! assert!(suggest.is_drop_down_open());
//!
//! suggest.on_key(Key::ArrowDown).unwrap();
//! suggest.on_key(Key::Enter).unwrap();
//! assert_eq!(suggest.selected_item().as_deref(), Some("Alabama"));
//! assert_eq!(suggest.text().as_deref(), Some("Alabama"));
//! assert!(!suggest.is_drop_down_open());
//! ```

use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use horizon_suggest_core::logging::targets;
use horizon_suggest_core::{Clock, Property, ReadOnlyProperty, SyncGuard, SystemClock};

use crate::Candidate;
use crate::config::{self, SuggestBoxConfig};
use crate::dropdown::{DropDownLifecycle, DropDownState, Transition};
use crate::engine::{FilterEngine, PassCanceller, PassOutcome, TextFormatter};
use crate::error::{Error, Result};
use crate::events::{Key, SelectionChange, SuggestBoxSignals};
use crate::field::TextField;
use crate::filter::{self, FilterMode, TextPredicate};
use crate::population::{PopulationController, PopulationState, Schedule};
use crate::selection::{AdapterResponse, ListSelectionAdapter, SelectionAdapter};
use crate::source::{CandidateCollection, CandidateSource, CollectionChange};

/// A headless autocomplete text box.
pub struct SuggestBox<T: Candidate> {
    /// Notifications sent by the control.
    pub signals: SuggestBoxSignals<T>,

    text: Property<Option<String>>,
    field: TextField,
    search_text: ReadOnlyProperty<String>,
    selected_item: Property<Option<T>>,

    source: CandidateSource<T>,
    engine: FilterEngine<T>,
    population: PopulationController,
    drop_down: DropDownLifecycle,
    adapter: Box<dyn SelectionAdapter<T>>,

    filter_mode: FilterMode,
    text_filter: Option<TextPredicate>,
    custom_filter: Option<TextPredicate>,
    exact_match: TextPredicate,
    formatter: TextFormatter<T>,
    clock: Arc<dyn Clock>,

    is_enabled: bool,
    has_focus: bool,
    is_adding_inner_content_enabled: bool,
    is_adding_inner_content_visible: bool,
    max_drop_down_height: f64,

    /// Held while the control rewrites its own text; such writes never
    /// schedule population.
    text_echo: SyncGuard,
    /// Held while text completion changes the selection; the typed text is
    /// left alone.
    skip_selection_text: SyncGuard,
    /// Text completion selected the current item and no commit has run since.
    completion_committed: bool,
}

impl<T: Candidate> SuggestBox<T> {
    /// A control with default options, no candidates and no text.
    pub fn new() -> Self {
        Self::build(&SuggestBoxConfig::default())
    }

    /// A control configured from validated options.
    pub fn from_config(config: &SuggestBoxConfig) -> Result<Self> {
        config.validate()?;
        let mut suggest = Self::build(config);
        suggest.set_filter_mode(config.filter_mode)?;
        Ok(suggest)
    }

    fn build(config: &SuggestBoxConfig) -> Self {
        let formatter: TextFormatter<T> = Arc::new(|item: &T| item.to_string());
        Self {
            signals: SuggestBoxSignals::new(),
            text: Property::new(None),
            field: TextField::default(),
            search_text: ReadOnlyProperty::new("search_text", String::new()),
            selected_item: Property::new(None),
            source: CandidateSource::new(),
            engine: FilterEngine::new(),
            population: PopulationController::new(config.debounce_delay()),
            drop_down: DropDownLifecycle::new(),
            adapter: Box::new(ListSelectionAdapter::new()),
            filter_mode: config.filter_mode,
            text_filter: filter::predicate(config.filter_mode),
            custom_filter: None,
            exact_match: Arc::new(filter::equals_case_sensitive),
            formatter,
            clock: Arc::new(SystemClock),
            is_enabled: true,
            has_focus: false,
            is_adding_inner_content_enabled: config.is_adding_inner_content_enabled,
            is_adding_inner_content_visible: false,
            max_drop_down_height: config.max_drop_down_height,
            text_echo: SyncGuard::new("text_echo"),
            skip_selection_text: SyncGuard::new("skip_selection_text"),
            completion_committed: false,
        }
    }

    // =========================================================================
    // Builder Pattern Methods
    // =========================================================================

    /// Set how candidates are turned into display text.
    pub fn with_text_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.set_text_formatter(formatter);
        self
    }

    /// Filter through a custom text predicate.
    pub fn with_text_filter(mut self, predicate: TextPredicate) -> Self {
        self.set_text_filter(Some(predicate));
        self
    }

    /// Read time from `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Present the view through a different selection list.
    pub fn with_selection_adapter<A>(mut self, mut adapter: A) -> Self
    where
        A: SelectionAdapter<T> + 'static,
    {
        adapter.set_items(self.engine.snapshot());
        self.adapter = Box::new(adapter);
        self
    }

    /// Draw candidates from `source`.
    pub fn with_source(mut self, source: Arc<dyn CandidateCollection<T>>) -> Self {
        self.source.set_source(Some(source));
        self
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The display text.
    pub fn text(&self) -> Option<String> {
        self.text.get()
    }

    /// The editor contents.
    pub fn field_text(&self) -> &str {
        self.field.text()
    }

    /// The selected range in the editor.
    pub fn field_selection(&self) -> Range<usize> {
        self.field.selection()
    }

    /// The display text as it was when the last population cycle began.
    pub fn search_text(&self) -> String {
        self.search_text.get()
    }

    /// The selected candidate.
    pub fn selected_item(&self) -> Option<T> {
        self.selected_item.get()
    }

    /// The filtered view, in source order.
    pub fn view(&self) -> &[T] {
        self.engine.view()
    }

    /// A shared read-only copy of the filtered view.
    pub fn view_snapshot(&self) -> Arc<[T]> {
        self.engine.snapshot()
    }

    /// Every candidate, in source order.
    pub fn candidates(&self) -> &[T] {
        self.source.snapshot()
    }

    /// Whether the drop-down is open.
    pub fn is_drop_down_open(&self) -> bool {
        self.drop_down.is_open()
    }

    /// Where the drop-down is in its open/close cycle.
    pub fn drop_down_state(&self) -> DropDownState {
        self.drop_down.state()
    }

    /// Where the control is in a population cycle.
    pub fn population_state(&self) -> PopulationState {
        self.population.state()
    }

    /// Whether the "add new content" affordance should be shown.
    pub fn is_adding_inner_content_visible(&self) -> bool {
        self.is_adding_inner_content_visible
    }

    /// Whether the "add new content" affordance may be shown at all.
    pub fn is_adding_inner_content_enabled(&self) -> bool {
        self.is_adding_inner_content_enabled
    }

    /// The active filter mode.
    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    /// The debounce delay.
    pub fn debounce_delay(&self) -> Duration {
        self.population.delay()
    }

    /// Upper bound for the drop-down's height.
    pub fn max_drop_down_height(&self) -> f64 {
        self.max_drop_down_height
    }

    /// Whether the control accepts input.
    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    /// Whether the control has keyboard focus.
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// The selection list.
    pub fn selection_adapter(&self) -> &dyn SelectionAdapter<T> {
        self.adapter.as_ref()
    }

    /// The selection list, for pointer interaction.
    pub fn selection_adapter_mut(&mut self) -> &mut dyn SelectionAdapter<T> {
        self.adapter.as_mut()
    }

    /// A handle that abandons a filter pass from inside a predicate.
    pub fn pass_canceller(&self) -> PassCanceller {
        self.engine.canceller()
    }

    /// The display text of a candidate. `None` formats as an empty string.
    pub fn format_value(&self, item: Option<&T>) -> String {
        item.map(|item| (self.formatter)(item)).unwrap_or_default()
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Set the debounce delay in milliseconds.
    ///
    /// A negative delay is rejected and the previous delay kept. A pending
    /// countdown is dropped either way the delay changes.
    pub fn set_debounce_delay_ms(&mut self, millis: i64) -> Result<()> {
        let delay = config::validate_debounce_delay(millis)?;
        self.population.set_delay(delay)?;
        Ok(())
    }

    /// Set the upper bound for the drop-down's height.
    pub fn set_max_drop_down_height(&mut self, height: f64) -> Result<()> {
        self.max_drop_down_height = config::validate_max_drop_down_height(height)?;
        Ok(())
    }

    /// Switch the filter mode.
    ///
    /// [`FilterMode::Custom`] needs a predicate from
    /// [`set_text_filter`](Self::set_text_filter); without one the mode is
    /// rejected and the previous mode kept.
    pub fn set_filter_mode(&mut self, mode: FilterMode) -> Result<()> {
        let predicate = match mode {
            FilterMode::Custom => match &self.custom_filter {
                Some(custom) => Some(Arc::clone(custom)),
                None => {
                    tracing::error!(target: targets::FILTER, "custom filter mode without a text predicate");
                    return Err(Error::UnsupportedFilterMode(mode));
                }
            },
            mode => filter::predicate(mode),
        };
        tracing::debug!(target: targets::FILTER, from = ?self.filter_mode, to = ?mode, "filter mode");
        self.filter_mode = mode;
        self.text_filter = predicate;
        Ok(())
    }

    /// Install a custom text predicate and switch to [`FilterMode::Custom`].
    ///
    /// `None` removes the custom predicate. If the control is in custom mode
    /// the next filter pass then fails with [`Error::UnsupportedFilterMode`]
    /// until another mode or predicate is set.
    pub fn set_text_filter(&mut self, predicate: Option<TextPredicate>) {
        self.custom_filter = predicate.clone();
        match predicate {
            Some(predicate) => {
                self.filter_mode = FilterMode::Custom;
                self.text_filter = Some(predicate);
            }
            None if self.filter_mode == FilterMode::Custom => self.text_filter = None,
            None => {}
        }
    }

    /// Set how candidates are turned into display text.
    pub fn set_text_formatter<F>(&mut self, formatter: F)
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.formatter = Arc::new(formatter);
    }

    /// Allow or forbid the "add new content" affordance.
    pub fn set_adding_inner_content_enabled(&mut self, enabled: bool) {
        self.is_adding_inner_content_enabled = enabled;
        if !enabled {
            self.set_adding_visible(false);
        }
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// The user edited the text field.
    pub fn on_text_input(&mut self, text: &str) -> Result<()> {
        self.apply_source_changes()?;
        if self.field.text() == text {
            // The editor is reporting back what the control wrote.
            return Ok(());
        }
        self.field.set_text(text);
        self.text_updated(Some(text.to_string()), true)
    }

    /// Set the display text programmatically.
    ///
    /// Population still runs, but the drop-down is never opened for a
    /// programmatic update.
    pub fn set_text(&mut self, text: Option<String>) -> Result<()> {
        self.apply_source_changes()?;
        if self.text.with(|current| *current == text) {
            return Ok(());
        }
        self.text_updated(text, false)
    }

    /// A text change from either side, tagged with its origin.
    ///
    /// A user-initiated `None` is treated as empty text, since an editor
    /// always holds a string.
    pub fn on_text_changed(&mut self, text: Option<String>, is_user_initiated: bool) -> Result<()> {
        if is_user_initiated {
            self.on_text_input(text.as_deref().unwrap_or_default())
        } else {
            self.set_text(text)
        }
    }

    /// Always fails: the search text is only written by population cycles.
    pub fn try_set_search_text(&mut self, value: String) -> Result<()> {
        match self.search_text.try_set(value) {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(target: targets::SUGGEST, error = %e, "search text written from outside");
                Err(e.into())
            }
        }
    }

    fn text_updated(&mut self, text: Option<String>, user_initiated: bool) -> Result<()> {
        self.update_text_value(text);
        if self.text_echo.is_held() {
            return Ok(());
        }

        let now = self.clock.now();
        match self.population.text_updated(now, user_initiated)? {
            Schedule::Immediate => self.populate_drop_down(),
            Schedule::Debounced => Ok(()),
        }
    }

    /// Write the display text and the editor, then announce the change.
    fn update_text_value(&mut self, text: Option<String>) {
        let field_changed = self.field.set_text(text.as_deref().unwrap_or_default());
        let text_changed = self.text.set(text.clone());
        if field_changed || text_changed {
            tracing::trace!(target: targets::SUGGEST, ?text, "text changed");
            self.signals.text_changed.emit(text);
        }
    }

    fn rewrite_text(&mut self, text: String) -> Result<()> {
        let _echo = self.text_echo.acquire();
        self.text_updated(Some(text), false)
    }

    fn write_search_text(&self, value: String) {
        let access = self.search_text.unlock();
        access.set(value);
    }

    // =========================================================================
    // Candidates
    // =========================================================================

    /// Replace the candidate collection, or detach with `None`.
    ///
    /// The view is emptied. If the drop-down is open it is refiltered
    /// against the new candidates.
    pub fn set_source(&mut self, source: Option<Arc<dyn CandidateCollection<T>>>) -> Result<()> {
        self.source.set_source(source);
        self.engine.clear();
        self.adapter.set_items(self.engine.snapshot());
        if self.drop_down.is_open() {
            self.refresh_after_source_change()?;
        }
        Ok(())
    }

    /// Mirror a change to a collection that does not announce its own changes.
    pub fn on_source_change(&mut self, change: CollectionChange<T>) -> Result<()> {
        self.apply_source_changes()?;
        self.apply_source_change(change)
    }

    /// Mirror every change the attached collection has announced.
    pub fn process_source_changes(&mut self) -> Result<()> {
        self.apply_source_changes()
    }

    fn apply_source_changes(&mut self) -> Result<()> {
        if !self.source.has_pending() {
            return Ok(());
        }
        for change in self.source.drain_pending() {
            self.apply_source_change(change)?;
        }
        Ok(())
    }

    fn apply_source_change(&mut self, change: CollectionChange<T>) -> Result<()> {
        let effect = self.source.apply_change(change);
        if effect.rebuilt {
            self.engine.clear();
        } else {
            self.engine.remove_items(&effect.removed);
        }
        self.refresh_after_source_change()
    }

    fn refresh_after_source_change(&mut self) -> Result<()> {
        let before = self.engine.snapshot();
        let query = self.text.get().unwrap_or_default();
        self.engine.refresh(
            self.source.snapshot(),
            Some(query.as_str()),
            self.filter_mode,
            self.text_filter.as_ref(),
            &self.formatter,
        )?;
        if *before != *self.engine.view() {
            self.adapter.set_items(self.engine.snapshot());
        }
        Ok(())
    }

    // =========================================================================
    // Population
    // =========================================================================

    /// Run a population cycle if the debounce has elapsed.
    ///
    /// Returns `true` if a cycle ran. Hosts call this from their event loop,
    /// waiting at most [`time_until_next_populate`](Self::time_until_next_populate).
    pub fn process_timers(&mut self) -> Result<bool> {
        self.apply_source_changes()?;
        let now = self.clock.now();
        if !self.population.poll(now) {
            return Ok(false);
        }
        self.populate_drop_down()?;
        Ok(true)
    }

    /// Time left before the pending population cycle runs.
    pub fn time_until_next_populate(&mut self) -> Option<Duration> {
        let now = self.clock.now();
        self.population.time_until_due(now)
    }

    fn populate_drop_down(&mut self) -> Result<()> {
        self.population.begin()?;

        let search_text = self.text.get().unwrap_or_default();
        self.write_search_text(search_text.clone());
        tracing::debug!(target: targets::POPULATION, search_text = %search_text, "populating");

        if self.signals.populating.emit(search_text).is_cancel() {
            tracing::debug!(target: targets::POPULATION, "population taken over by host");
            self.population.suppress();
            return Ok(());
        }
        self.filter_and_finish()
    }

    /// Finish a population cycle by filtering the current candidates.
    ///
    /// Hosts that canceled `populating` call this once they have updated the
    /// candidate collection.
    pub fn populate_complete(&mut self) -> Result<()> {
        self.apply_source_changes()?;
        self.filter_and_finish()
    }

    /// Finish a population cycle with a view the host built itself.
    pub fn populate_complete_with(&mut self, view: Vec<T>) -> Result<()> {
        self.apply_source_changes()?;
        self.engine.replace_view(view);
        self.finish_population()
    }

    fn filter_and_finish(&mut self) -> Result<()> {
        let query = self.search_text.get();
        let outcome = self.engine.refresh(
            self.source.snapshot(),
            Some(query.as_str()),
            self.filter_mode,
            self.text_filter.as_ref(),
            &self.formatter,
        );
        match outcome {
            Ok(PassOutcome::Completed) => self.finish_population(),
            Ok(PassOutcome::Superseded) => {
                self.population.finish();
                Ok(())
            }
            Err(e) => {
                self.population.finish();
                Err(e)
            }
        }
    }

    fn finish_population(&mut self) -> Result<()> {
        let view = self.engine.snapshot();
        self.signals.populated.emit(Arc::clone(&view));
        self.adapter.set_items(Arc::clone(&view));

        let open = self.is_enabled && self.population.is_user_initiated() && !view.is_empty();
        tracing::debug!(target: targets::POPULATION, matched = view.len(), open, "populated");
        if open {
            self.drop_down.open(&self.signals.drop_down());
        } else {
            self.close_drop_down();
        }

        let completed = self.complete_text();
        self.population.finish();
        completed
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a candidate, or clear the selection with `None`.
    ///
    /// The display text is rewritten to the candidate's formatted text.
    /// Fails with [`Error::NotACandidate`] if the item is not in the
    /// candidate collection.
    pub fn set_selected_item(&mut self, item: Option<T>) -> Result<()> {
        self.apply_source_changes()?;
        if let Some(candidate) = &item {
            if !self.source.contains(candidate) {
                tracing::error!(target: targets::SELECTION, "selected item is not a candidate");
                return Err(Error::NotACandidate);
            }
        }
        self.apply_selected_item(item)
    }

    /// Associate the display text with an exactly matching candidate.
    ///
    /// The match is case-sensitive and looked up in the filtered view. A
    /// match becomes the selection without touching the typed text. Without
    /// a match the selection is cleared and, if there is text, the "add new
    /// content" affordance is raised.
    pub fn complete_text(&mut self) -> Result<()> {
        let text = self.text.get();
        let matched = if self.engine.is_empty() {
            None
        } else {
            self.engine
                .find(text.as_deref(), &self.exact_match, &self.formatter)
        };

        match matched {
            Some(item) => {
                self.set_adding_visible(false);
                if self.selected_item.with(|selected| selected.as_ref() != Some(&item)) {
                    let _skip = self.skip_selection_text.acquire();
                    self.completion_committed = true;
                    self.apply_selected_item(Some(item))?;
                }
            }
            None => {
                self.set_adding_visible(text.as_deref().is_some_and(|t| !t.is_empty()));
                if self.selected_item.with(Option::is_some) {
                    let _skip = self.skip_selection_text.acquire();
                    self.completion_committed = false;
                    self.apply_selected_item(None)?;
                }
            }
        }
        Ok(())
    }

    /// Accept the highlighted candidate and close the drop-down.
    pub fn commit(&mut self) -> Result<()> {
        self.complete_selection(true)
    }

    /// Restore the text from before the drop-down opened and re-run text
    /// completion.
    ///
    /// A pending population cycle is dropped. The search text is empty once
    /// a selection has been committed; there is nothing to restore then and
    /// the text is kept.
    pub fn cancel(&mut self) -> Result<()> {
        self.population.cancel_pending()?;
        let search_text = self.search_text.get();
        if !search_text.is_empty() {
            self.rewrite_text(search_text)?;
        }
        self.complete_text()
    }

    /// The selection list reported that the user accepted its highlight.
    pub fn on_selection_adapter_commit(&mut self) -> Result<()> {
        self.apply_source_changes()?;
        self.commit()
    }

    /// The selection list reported that the user abandoned it.
    pub fn on_selection_adapter_cancel(&mut self) -> Result<()> {
        self.apply_source_changes()?;
        self.cancel()?;
        self.complete_selection(false)
    }

    fn complete_selection(&mut self, from_commit: bool) -> Result<()> {
        self.population.cancel_pending()?;
        let selected = self.selected_item.get();
        if from_commit {
            let text_is_empty = self.text.with(|t| t.as_deref().is_none_or(str::is_empty));
            match self.adapter.highlighted() {
                Some(highlighted) if selected.as_ref() != Some(&highlighted) => {
                    self.apply_selected_item(Some(highlighted))?
                }
                Some(highlighted) => self.on_selected_item_changed(Some(&highlighted))?,
                None if text_is_empty => self.apply_selected_item(None)?,
                None if self.completion_committed => self.completion_committed = false,
                None => self.on_selected_item_changed(selected.as_ref())?,
            }
        } else {
            self.on_selected_item_changed(selected.as_ref())?;
        }

        self.close_drop_down();
        self.field.clear_selection();
        self.write_search_text(String::new());
        tracing::debug!(target: targets::SELECTION, from_commit, "selection complete");
        Ok(())
    }

    fn apply_selected_item(&mut self, item: Option<T>) -> Result<()> {
        let Some(previous) = self.selected_item.replace(item.clone()) else {
            return Ok(());
        };
        tracing::debug!(
            target: targets::SELECTION,
            selected = %self.format_value(item.as_ref()),
            "selection changed"
        );
        if !self.skip_selection_text.is_held() {
            self.on_selected_item_changed(item.as_ref())?;
        }
        self.signals
            .selection_changed
            .emit(SelectionChange::new(previous, item));
        Ok(())
    }

    /// Bring the text in line with the selection.
    ///
    /// A cleared selection restores the search text, if there is one.
    fn on_selected_item_changed(&mut self, item: Option<&T>) -> Result<()> {
        self.set_adding_visible(false);
        let text = match item {
            Some(item) => Some(self.format_value(Some(item))),
            None => Some(self.search_text.get()).filter(|s| !s.is_empty()),
        };
        if let Some(text) = text {
            self.rewrite_text(text)?;
        }
        self.field.clear_selection();
        Ok(())
    }

    fn set_adding_visible(&mut self, visible: bool) {
        let visible = visible && self.is_adding_inner_content_enabled;
        if self.is_adding_inner_content_visible != visible {
            self.is_adding_inner_content_visible = visible;
            self.signals.adding_content_visibility_changed.emit(visible);
        }
    }

    // =========================================================================
    // Drop-down, keyboard and focus
    // =========================================================================

    /// Ask for the drop-down to open or close.
    ///
    /// Opening runs a user-initiated population cycle for the current text;
    /// the drop-down opens once the cycle finds candidates. Closing is
    /// negotiated through `drop_down_closing`.
    pub fn set_drop_down_open(&mut self, open: bool) -> Result<()> {
        self.apply_source_changes()?;
        if !open {
            self.close_drop_down();
            return Ok(());
        }
        if !self.is_enabled {
            return Ok(());
        }
        let text = self.text.get();
        self.text_updated(text, true)
    }

    /// The presentation layer closed the popup on its own.
    pub fn on_popup_dismissed(&mut self) {
        self.force_close_drop_down();
    }

    /// Enable or disable the control.
    ///
    /// Disabling closes the drop-down without a `drop_down_closing`
    /// pre-event and drops a pending population cycle.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if self.is_enabled == enabled {
            return Ok(());
        }
        self.is_enabled = enabled;
        if !enabled {
            self.population.cancel_pending()?;
            self.force_close_drop_down();
        }
        Ok(())
    }

    /// Handle a key press. Returns `true` if the key was consumed.
    pub fn on_key(&mut self, key: Key) -> Result<bool> {
        self.apply_source_changes()?;
        if !self.is_enabled {
            return Ok(false);
        }

        if key == Key::ArrowDown && !self.drop_down.is_open() {
            self.set_drop_down_open(true)?;
            return Ok(true);
        }

        match self.adapter.handle_key(key) {
            AdapterResponse::Handled => return Ok(true),
            AdapterResponse::Commit => {
                self.commit()?;
                return Ok(true);
            }
            AdapterResponse::Cancel => {
                self.on_selection_adapter_cancel()?;
                return Ok(true);
            }
            AdapterResponse::Ignored => {}
        }

        match key {
            Key::Escape => {
                self.cancel()?;
                Ok(true)
            }
            Key::Enter if self.drop_down.is_open() => {
                self.commit()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Keyboard focus entered or left the control.
    ///
    /// Gaining focus selects the whole text and asks for the drop-down.
    /// Losing focus settles the selection and closes the drop-down.
    pub fn on_focus_changed(&mut self, has_focus: bool) -> Result<()> {
        self.apply_source_changes()?;
        let was_focused = std::mem::replace(&mut self.has_focus, has_focus);

        if has_focus {
            if !was_focused && self.field.selection_len() == 0 {
                self.field.select_all();
                self.set_drop_down_open(true)?;
            }
            return Ok(());
        }

        self.complete_selection(false)?;
        self.population.clear_user_initiated();
        self.field.clear_selection();
        Ok(())
    }

    fn close_drop_down(&mut self) -> Transition {
        let transition = self.drop_down.close(&self.signals.drop_down());
        if transition.is_applied() {
            self.adapter.set_highlighted(None);
        }
        transition
    }

    fn force_close_drop_down(&mut self) -> Transition {
        let transition = self.drop_down.force_close(&self.signals.drop_down_closed);
        if transition.is_applied() {
            self.adapter.set_highlighted(None);
        }
        transition
    }
}

impl<T: Candidate> Default for SuggestBox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Candidate + fmt::Debug> fmt::Debug for SuggestBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestBox")
            .field("text", &self.text.get())
            .field("search_text", &self.search_text.get())
            .field("selected_item", &self.selected_item.get())
            .field("candidates", &self.source.snapshot().len())
            .field("view", &self.engine.len())
            .field("filter_mode", &self.filter_mode)
            .field("drop_down", &self.drop_down.state())
            .field("population", &self.population.state())
            .field("is_enabled", &self.is_enabled)
            .finish()
    }
}
