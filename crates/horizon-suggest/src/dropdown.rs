//! Drop-down open/close negotiation.
//!
//! Every change of the drop-down's open state is announced by a cancelable
//! pre-event. While the pre-event runs the lifecycle is in a transient
//! state ([`DropDownState::Opening`] or [`DropDownState::Closing`]); if any
//! slot cancels, the lifecycle returns to the stable state it came from and
//! the paired "opened"/"closed" notification is not sent.
//!
//! ```text
//! Closed ──open──▶ Opening ──proceed──▶ Open ──close──▶ Closing ──proceed──▶ Closed
//!    ▲               │ cancel                ▲              │ cancel
//!    └───────────────┘                       └──────────────┘
//! ```
//!
//! [`DropDownLifecycle::force_close`] skips the pre-event. It is used when
//! the control is disabled or the popup was dismissed by the presentation
//! layer.

use horizon_suggest_core::logging::targets;
use horizon_suggest_core::{CancelableSignal, Signal};

/// Where the drop-down is in its open/close cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DropDownState {
    /// Not shown.
    #[default]
    Closed,
    /// The opening pre-event is running.
    Opening,
    /// Shown.
    Open,
    /// The closing pre-event is running.
    Closing,
}

impl DropDownState {
    /// Whether the drop-down is open or has been asked to open.
    pub fn is_open(self) -> bool {
        matches!(self, DropDownState::Opening | DropDownState::Open)
    }

    /// Whether a pre-event is currently running.
    pub fn is_transient(self) -> bool {
        matches!(self, DropDownState::Opening | DropDownState::Closing)
    }
}

/// The result of an open or close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state changed and the paired notification was sent.
    Applied,
    /// A pre-event slot vetoed the change.
    Canceled,
    /// The drop-down was already in, or moving to, the requested state.
    Unchanged,
}

impl Transition {
    /// Whether the state changed.
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

/// The notifications a drop-down transition can send.
pub struct DropDownSignals<'a> {
    /// Cancelable pre-event for opening.
    pub opening: &'a CancelableSignal<()>,
    /// Sent once the drop-down is open.
    pub opened: &'a Signal<()>,
    /// Cancelable pre-event for closing.
    pub closing: &'a CancelableSignal<()>,
    /// Sent once the drop-down is closed.
    pub closed: &'a Signal<()>,
}

/// The drop-down open/close state machine.
#[derive(Debug, Default)]
pub struct DropDownLifecycle {
    state: DropDownState,
    has_opened: bool,
}

impl DropDownLifecycle {
    /// A closed drop-down that has never been opened.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    pub fn state(&self) -> DropDownState {
        self.state
    }

    /// Whether the drop-down is open or opening.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Whether the drop-down has been open at least once.
    pub fn has_opened(&self) -> bool {
        self.has_opened
    }

    /// Ask to open the drop-down.
    pub fn open(&mut self, signals: &DropDownSignals<'_>) -> Transition {
        if self.state != DropDownState::Closed {
            return Transition::Unchanged;
        }

        self.set_state(DropDownState::Opening);
        if signals.opening.emit(()).is_cancel() {
            self.set_state(DropDownState::Closed);
            tracing::debug!(target: targets::DROP_DOWN, "opening canceled");
            return Transition::Canceled;
        }

        self.set_state(DropDownState::Open);
        self.has_opened = true;
        signals.opened.emit(());
        Transition::Applied
    }

    /// Ask to close the drop-down.
    pub fn close(&mut self, signals: &DropDownSignals<'_>) -> Transition {
        if self.state != DropDownState::Open {
            return Transition::Unchanged;
        }

        self.set_state(DropDownState::Closing);
        if signals.closing.emit(()).is_cancel() {
            self.set_state(DropDownState::Open);
            tracing::debug!(target: targets::DROP_DOWN, "closing canceled");
            return Transition::Canceled;
        }

        self.finish_close(signals.closed);
        Transition::Applied
    }

    /// Close without asking. No pre-event is sent.
    pub fn force_close(&mut self, closed: &Signal<()>) -> Transition {
        if self.state == DropDownState::Closed {
            return Transition::Unchanged;
        }
        self.finish_close(closed);
        Transition::Applied
    }

    fn finish_close(&mut self, closed: &Signal<()>) {
        self.set_state(DropDownState::Closed);
        if self.has_opened {
            closed.emit(());
        }
    }

    fn set_state(&mut self, state: DropDownState) {
        if self.state != state {
            tracing::debug!(target: targets::DROP_DOWN, from = ?self.state, to = ?state, "drop-down state");
            self.state = state;
        }
    }
}
