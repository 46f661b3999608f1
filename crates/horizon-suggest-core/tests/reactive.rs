//! Integration tests combining signals, properties, guards and timers the way
//! a suggestion control wires them together.

use std::sync::Arc;
use std::time::Duration;

use horizon_suggest_core::{
    CancelableSignal, Clock, Decision, ManualClock, Property, ReadOnlyProperty, Signal, SyncGuard,
    TimerManager,
};
use parking_lot::Mutex;

/// A miniature text box: writes announce themselves through `text_changed`
/// unless the echo guard is held, in which case the write is the box
/// reflecting its own state and stays silent.
struct EchoingText {
    text: Property<String>,
    text_changed: Signal<String>,
    echo_guard: SyncGuard,
}

impl EchoingText {
    fn new() -> Self {
        Self {
            text: Property::default(),
            text_changed: Signal::new(),
            echo_guard: SyncGuard::new("echo"),
        }
    }

    fn write(&self, value: &str) {
        if self.text.set(value.to_string()) && !self.echo_guard.is_held() {
            self.text_changed.emit(value.to_string());
        }
    }
}

#[test]
fn test_guard_suppresses_programmatic_echo() {
    let field = EchoingText::new();
    let reactions = Arc::new(Mutex::new(Vec::new()));

    let reactions_clone = reactions.clone();
    field
        .text_changed
        .connect(move |text: &String| reactions_clone.lock().push(text.clone()));

    field.write("Tex");
    {
        let _token = field.echo_guard.acquire();
        field.write("Texas");
        assert_eq!(field.text.get(), "Texas");
    }
    field.write("Texa");

    assert!(!field.echo_guard.is_held());
    assert_eq!(*reactions.lock(), vec!["Tex".to_string(), "Texa".to_string()]);
}

#[test]
fn test_cancelable_pre_event_reverts_state() {
    let is_open = Property::new(false);
    let opening = CancelableSignal::<()>::new();
    let opened = Signal::<()>::new();
    let opened_count = Arc::new(Mutex::new(0));

    let opened_count_clone = opened_count.clone();
    opened.connect(move |_| *opened_count_clone.lock() += 1);
    let veto = opening.connect(|_| Decision::Cancel);

    let try_open = || {
        if !is_open.set(true) {
            return;
        }
        if opening.emit(()).is_cancel() {
            is_open.set(false);
        } else {
            opened.emit(());
        }
    };

    try_open();
    assert!(!is_open.get());
    assert_eq!(*opened_count.lock(), 0);

    opening.disconnect(veto);
    try_open();
    assert!(is_open.get());
    assert_eq!(*opened_count.lock(), 1);
}

#[test]
fn test_debounce_timer_restarts_on_each_keystroke() {
    let clock = ManualClock::new();
    let mut timers = TimerManager::new();
    let delay = Duration::from_millis(300);

    let mut pending = Some(timers.start_one_shot(clock.now(), delay));
    clock.advance(Duration::from_millis(200));

    // Another keystroke restarts the debounce
    if let Some(id) = pending.take() {
        timers.stop(id).unwrap();
    }
    let restarted = timers.start_one_shot(clock.now(), delay);

    clock.advance(Duration::from_millis(200));
    assert!(timers.process_expired(clock.now()).is_empty());

    clock.advance(Duration::from_millis(100));
    assert_eq!(timers.process_expired(clock.now()), vec![restarted]);
}

#[test]
fn test_read_only_property_is_writable_only_by_owner() {
    let search_text = ReadOnlyProperty::new("search_text", String::new());

    assert!(search_text.try_set("outside".into()).is_err());

    let access = search_text.unlock();
    access.set("Ala".into());
    drop(access);

    assert_eq!(search_text.get(), "Ala");
    assert!(search_text.try_set("outside".into()).is_err());
    assert_eq!(search_text.get(), "Ala");
}
