//! Debounced population scheduling.
//!
//! Every text update restarts a one-shot debounce timer. When it fires (or
//! immediately, with a zero delay) the control runs a population cycle:
//!
//! ```text
//! Idle ──text──▶ PendingDebounce ──elapsed──▶ Populating ──▶ Idle
//!                                                 │ populating canceled
//!                                                 ▼
//!                                          SuppressedByHost ──populate_complete──▶ Idle
//! ```
//!
//! [`PopulationController`] only owns the schedule and the state. The cycle
//! itself (snapshot, pre-event, filter pass, completion) lives on
//! [`SuggestBox`](crate::SuggestBox), which has the view and the signals.

use std::time::{Duration, Instant};

use horizon_suggest_core::logging::targets;
use horizon_suggest_core::{TimerError, TimerId, TimerManager};

/// Where the controller is in a population cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PopulationState {
    /// Nothing scheduled.
    #[default]
    Idle,
    /// The debounce timer is counting down.
    PendingDebounce,
    /// A cycle is running.
    Populating,
    /// The host canceled `populating` and owes a `populate_complete` call.
    SuppressedByHost,
}

/// What a text update asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// The delay is zero; populate now.
    Immediate,
    /// The debounce timer was (re)started.
    Debounced,
}

/// The debounce timer and population state of one control.
#[derive(Debug)]
pub struct PopulationController {
    state: PopulationState,
    delay: Duration,
    timers: TimerManager,
    timer: Option<TimerId>,
    user_initiated: bool,
}

impl PopulationController {
    /// An idle controller with the given debounce delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            state: PopulationState::Idle,
            delay,
            timers: TimerManager::new(),
            timer: None,
            user_initiated: false,
        }
    }

    /// The current state.
    pub fn state(&self) -> PopulationState {
        self.state
    }

    /// The debounce delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the debounce delay. A running countdown is dropped.
    pub fn set_delay(&mut self, delay: Duration) -> Result<(), TimerError> {
        self.cancel_pending()?;
        self.delay = delay;
        Ok(())
    }

    /// Whether the last text update came from the user.
    pub fn is_user_initiated(&self) -> bool {
        self.user_initiated
    }

    /// Forget that the user triggered the last update.
    pub fn clear_user_initiated(&mut self) {
        self.user_initiated = false;
    }

    /// Whether the debounce timer is counting down.
    pub fn is_pending(&self) -> bool {
        self.timer.is_some_and(|id| self.timers.is_active(id))
    }

    /// Record a text update and restart the debounce.
    pub fn text_updated(&mut self, now: Instant, user_initiated: bool) -> Result<Schedule, TimerError> {
        self.stop_timer()?;
        self.user_initiated = user_initiated;

        if self.delay.is_zero() {
            return Ok(Schedule::Immediate);
        }

        self.timer = Some(self.timers.start_one_shot(now, self.delay));
        self.set_state(PopulationState::PendingDebounce);
        Ok(Schedule::Debounced)
    }

    /// Check the debounce timer. Returns `true` once, when it has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(id) = self.timer else {
            return false;
        };
        if !self.timers.process_expired(now).contains(&id) {
            return false;
        }
        self.timer = None;
        tracing::trace!(target: targets::POPULATION, "debounce elapsed");
        true
    }

    /// Time left on the debounce, if it is running.
    pub fn time_until_due(&mut self, now: Instant) -> Option<Duration> {
        self.timer?;
        self.timers.time_until_next(now)
    }

    /// Drop a pending countdown without populating.
    pub fn cancel_pending(&mut self) -> Result<(), TimerError> {
        self.stop_timer()?;
        if self.state == PopulationState::PendingDebounce {
            self.set_state(PopulationState::Idle);
        }
        Ok(())
    }

    /// Enter [`PopulationState::Populating`].
    pub fn begin(&mut self) -> Result<(), TimerError> {
        self.stop_timer()?;
        self.set_state(PopulationState::Populating);
        Ok(())
    }

    /// The host took over the running cycle.
    pub fn suppress(&mut self) {
        self.set_state(PopulationState::SuppressedByHost);
    }

    /// The cycle ended, successfully or not.
    pub fn finish(&mut self) {
        self.set_state(PopulationState::Idle);
    }

    fn stop_timer(&mut self) -> Result<(), TimerError> {
        match self.timer.take() {
            Some(id) if self.timers.is_active(id) => self.timers.stop(id),
            _ => Ok(()),
        }
    }

    fn set_state(&mut self, state: PopulationState) {
        if self.state != state {
            tracing::debug!(target: targets::POPULATION, from = ?self.state, to = ?state, "population state");
            self.state = state;
        }
    }
}

impl Default for PopulationController {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
