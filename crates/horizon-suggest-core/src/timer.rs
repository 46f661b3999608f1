//! Timer system for Horizon Suggest.
//!
//! Provides one-shot timers driven by an explicit "now".
//! Nothing here sleeps or spawns threads: the host asks how long until the
//! next timer is due, waits however it likes, and then calls
//! [`TimerManager::process_expired`] with the current instant.
//!
//! Time comes from a [`Clock`]. [`SystemClock`] reads the monotonic clock and
//! [`ManualClock`] only moves when told to, which makes debounce behaviour
//! deterministic in tests.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::TimerError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// A source of monotonic time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The system's monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only advances when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the component under test.
///
/// ```
/// use std::time::Duration;
/// use horizon_suggest_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(clock.now() - start, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Create a manual clock starting at the current system instant.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer fires.
    next_fire: Instant,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages a set of timers.
///
/// Stopped timers are removed from the registry immediately; their stale
/// queue entries are discarded lazily when they reach the front.
#[derive(Debug)]
pub struct TimerManager {
    /// All registered timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn start_one_shot(&mut self, now: Instant, duration: Duration) -> TimerId {
        let next_fire = now + duration;
        let id = self.timers.insert(TimerData { next_fire });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });

        tracing::trace!(target: targets::TIMER, ?id, ?duration, "timer started");
        id
    }

    /// Stop and remove a timer.
    ///
    /// Returns an error if the timer is unknown or has already fired.
    pub fn stop(&mut self, id: TimerId) -> Result<(), TimerError> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId)
        }
    }

    /// Check if a timer is currently active.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    ///
    /// Returns `None` if there are no active timers.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.discard_stale();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Process all timers due at or before `now`.
    ///
    /// Returns the IDs of the timers that fired, earliest first.
    #[tracing::instrument(skip(self), target = "horizon_suggest_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let id = entry.id;
            // Stopped timers leave their queue entry behind.
            if self.timers.remove(id).is_none() {
                continue;
            }

            tracing::trace!(target: targets::TIMER, ?id, "timer fired");
            fired.push(id);
        }

        fired
    }

    /// Get the number of active timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    fn discard_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            let live = self
                .timers
                .get(entry.id)
                .is_some_and(|t| t.next_fire == entry.fire_time);
            if live {
                break;
            }
            self.queue.pop();
        }
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_one_shot_fires_once() {
        let clock = ManualClock::new();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(clock.now(), 100 * MS);

        clock.advance(99 * MS);
        assert!(timers.process_expired(clock.now()).is_empty());

        clock.advance(MS);
        assert_eq!(timers.process_expired(clock.now()), vec![id]);
        assert!(!timers.is_active(id));

        clock.advance(500 * MS);
        assert!(timers.process_expired(clock.now()).is_empty());
    }

    #[test]
    fn test_stopped_timer_never_fires() {
        let clock = ManualClock::new();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(clock.now(), 10 * MS);

        timers.stop(id).unwrap();
        assert!(matches!(timers.stop(id), Err(TimerError::InvalidTimerId)));

        clock.advance(20 * MS);
        assert!(timers.process_expired(clock.now()).is_empty());
        assert_eq!(timers.time_until_next(clock.now()), None);
    }

    #[test]
    fn test_time_until_next_reports_earliest() {
        let clock = ManualClock::new();
        let mut timers = TimerManager::new();
        let late = timers.start_one_shot(clock.now(), 300 * MS);
        let early = timers.start_one_shot(clock.now(), 100 * MS);

        assert_eq!(timers.time_until_next(clock.now()), Some(100 * MS));

        timers.stop(early).unwrap();
        assert_eq!(timers.time_until_next(clock.now()), Some(300 * MS));

        clock.advance(400 * MS);
        assert_eq!(timers.time_until_next(clock.now()), Some(Duration::ZERO));
        assert_eq!(timers.process_expired(clock.now()), vec![late]);
    }

    #[test]
    fn test_expired_timers_fire_in_order() {
        let clock = ManualClock::new();
        let mut timers = TimerManager::new();
        let second = timers.start_one_shot(clock.now(), 20 * MS);
        let first = timers.start_one_shot(clock.now(), 10 * MS);

        clock.advance(50 * MS);
        assert_eq!(timers.process_expired(clock.now()), vec![first, second]);
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
