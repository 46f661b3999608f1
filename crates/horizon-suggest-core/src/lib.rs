//! Core systems for Horizon Suggest.
//!
//! This crate provides the reactive building blocks the suggestion engine is
//! made of:
//!
//! - **Signal/Slot System**: Type-safe notifications, including cancelable pre-events
//! - **Property System**: Reactive properties with change detection and read-only access
//! - **Re-entrancy Guards**: Scoped flags that suppress feedback loops
//! - **Timers**: One-shot timers driven by an injectable clock
//!
//! Everything here is synchronous. No component spawns threads or sleeps; the
//! host drives time by calling into the timer system.
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_suggest_core::Signal;
//!
//! // Create a signal that notifies when the query changes
//! let query_changed = Signal::<String>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = query_changed.connect(|query| {
//!     println!("Query changed to: {}", query);
//! });
//!
//! // Emit the signal
//! query_changed.emit("ala".to_string());
//!
//! // Disconnect when done
//! query_changed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_suggest_core::{Clock, ManualClock, TimerManager};
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerManager::new();
//! let debounce = timers.start_one_shot(clock.now(), Duration::from_millis(300));
//!
//! clock.advance(Duration::from_millis(300));
//! assert_eq!(timers.process_expired(clock.now()), vec![debounce]);
//! ```

mod error;
pub mod guard;
pub mod logging;
pub mod property;
pub mod signal;
pub mod timer;

pub use error::TimerError;
pub use guard::{GuardToken, SyncGuard};
pub use logging::PerfSpan;
pub use property::{Property, PropertyError, ReadOnlyProperty, WriteAccess};
pub use signal::{CancelableSignal, ConnectionId, Decision, Signal, Subscription};
pub use timer::{Clock, ManualClock, SystemClock, TimerId, TimerManager};
