//! Signal/slot system for Horizon Suggest.
//!
//! This module provides a type-safe, Qt-inspired signal/slot mechanism for
//! notifying interested parties about state changes. Signals are emitted by
//! a control when its state changes, and connected slots (callbacks) are
//! invoked synchronously, in connection order, on the emitting thread.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - A plain notification
//! - [`CancelableSignal<Args>`] - A pre-event whose slots may veto the pending change
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`Subscription`] - An owned connection that disconnects when dropped
//!
//! # Re-entrancy
//!
//! The slot list is snapshotted before any slot runs. A slot may therefore
//! connect or disconnect slots on the very signal that is invoking it; the
//! change takes effect on the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_suggest_core::Signal;
//!
//! // Create a signal that passes a string argument
//! let text_changed = Signal::<String>::new();
//!
//! // Connect a slot (closure)
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! // Emit the signal
//! text_changed.emit("Hello, World!".to_string());
//!
//! // Disconnect when done
//! text_changed.disconnect(conn_id);
//! ```
//!
//! # Cancelable Example
//!
//! ```
//! use horizon_suggest_core::{CancelableSignal, Decision};
//!
//! let opening = CancelableSignal::<()>::new();
//! opening.connect(|_| Decision::Cancel);
//!
//! assert!(opening.emit(()).is_cancel());
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};
use static_assertions::assert_impl_all;

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

/// Outcome of a cancelable pre-event.
///
/// Returned by every slot of a [`CancelableSignal`]. The pending change is
/// applied only if no slot answered [`Decision::Cancel`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Let the pending change go ahead.
    #[default]
    Proceed,
    /// Veto the pending change.
    Cancel,
}

impl Decision {
    /// Returns `true` if this decision vetoes the change.
    pub fn is_cancel(self) -> bool {
        self == Self::Cancel
    }

    /// Returns `true` if this decision lets the change go ahead.
    pub fn is_proceed(self) -> bool {
        self == Self::Proceed
    }

    /// Combines two decisions; any cancel wins.
    pub fn and(self, other: Decision) -> Decision {
        if self.is_cancel() || other.is_cancel() {
            Decision::Cancel
        } else {
            Decision::Proceed
        }
    }
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
type CancelSlot<Args> = Arc<dyn Fn(&Args) -> Decision + Send + Sync>;

/// Shared connection bookkeeping for both signal flavours.
struct Connections<S> {
    slots: Mutex<SlotMap<ConnectionId, S>>,
}

impl<S: Clone> Connections<S> {
    fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    fn insert(&self, slot: S) -> ConnectionId {
        self.slots.lock().insert(slot)
    }

    fn remove(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Copies out the current slots so the lock is not held while they run.
    fn snapshot(&self) -> Vec<S> {
        self.slots.lock().values().cloned().collect()
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with the
/// provided arguments.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
///
/// # Related Types
///
/// - [`ConnectionId`] - Returned by [`connect`](Self::connect), used to disconnect
/// - [`Subscription`] - An owned connection that disconnects on drop
/// - [`crate::Property`] - Often paired with signals for change notification
pub struct Signal<Args> {
    connections: Connections<Slot<Args>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Connections::new(),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_suggest_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.insert(Arc::new(slot))
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.remove(id)
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Emit the signal, invoking all connected slots in connection order.
    #[tracing::instrument(skip_all, target = "horizon_suggest_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let slots = self.connections.snapshot();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

/// A signal whose slots can veto the change being announced.
///
/// Every connected slot is invoked, even after one of them has canceled, so
/// each observer sees the pre-event. The combined result is
/// [`Decision::Cancel`] if any slot canceled.
pub struct CancelableSignal<Args> {
    connections: Connections<CancelSlot<Args>>,
}

impl<Args: Send + 'static> Default for CancelableSignal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> CancelableSignal<Args> {
    /// Create a new cancelable signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Connections::new(),
        }
    }

    /// Connect a slot that decides whether the change may proceed.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) -> Decision + Send + Sync + 'static,
    {
        self.connections.insert(Arc::new(slot))
    }

    /// Connect a slot that only observes the pre-event and never cancels.
    pub fn observe<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect(move |args| {
            slot(args);
            Decision::Proceed
        })
    }

    /// Disconnect a specific slot by its connection ID.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.remove(id)
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Emit the pre-event and collect the slots' decisions.
    #[tracing::instrument(skip_all, target = "horizon_suggest_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> Decision {
        let slots = self.connections.snapshot();
        let decision = slots
            .iter()
            .fold(Decision::Proceed, |acc, slot| acc.and(slot(&args)));

        tracing::trace!(
            target: targets::SIGNAL,
            connection_count = slots.len(),
            ?decision,
            "emitted cancelable signal"
        );
        decision
    }
}

/// An owned subscription to a signal held behind an `Arc`.
///
/// The subscription does not borrow the signal, so it can be stored next to
/// other state. The slot is disconnected when the subscription is dropped or
/// [`cancel`](Self::cancel)ed.
pub struct Subscription<Args: Send + 'static> {
    disconnect: Option<Box<dyn FnOnce() + Send + Sync>>,
    id: ConnectionId,
    _marker: std::marker::PhantomData<fn(Args)>,
}

impl<Args: Send + 'static> Subscription<Args> {
    /// Subscribe `slot` to the signal produced by `project` on `owner`.
    ///
    /// `project` locates the signal inside the shared owner; it is called
    /// again at disconnect time, so the owner must outlive nothing but this
    /// subscription.
    pub fn new<O, P, F>(owner: Arc<O>, project: P, slot: F) -> Self
    where
        O: ?Sized + Send + Sync + 'static,
        P: Fn(&O) -> Option<&Signal<Args>> + Send + Sync + 'static,
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let Some(id) = project(owner.as_ref()).map(|signal| signal.connect(slot)) else {
            return Self::detached();
        };

        Self {
            disconnect: Some(Box::new(move || {
                if let Some(signal) = project(owner.as_ref()) {
                    signal.disconnect(id);
                }
            })),
            id,
            _marker: std::marker::PhantomData,
        }
    }

    /// A subscription that is not attached to anything.
    pub fn detached() -> Self {
        Self {
            disconnect: None,
            id: ConnectionId::default(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Whether this subscription is attached to a signal.
    pub fn is_attached(&self) -> bool {
        self.disconnect.is_some()
    }

    /// The ID of the underlying connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Disconnect now instead of on drop.
    pub fn cancel(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            tracing::trace!(target: targets::SIGNAL, id = ?self.id, "subscription torn down");
            disconnect();
        }
    }
}

impl<Args: Send + 'static> Drop for Subscription<Args> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<Args: Send + 'static> std::fmt::Debug for Subscription<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}

assert_impl_all!(Signal<i32>: Send, Sync);
assert_impl_all!(CancelableSignal<i32>: Send, Sync);
assert_impl_all!(Subscription<i32>: Send, Sync);
