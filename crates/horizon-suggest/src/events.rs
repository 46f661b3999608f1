//! Input keys and the notifications a [`SuggestBox`](crate::SuggestBox) sends.

use std::sync::Arc;

use horizon_suggest_core::{CancelableSignal, Signal};

use crate::dropdown::DropDownSignals;

/// A key the control reacts to.
///
/// Hosts translate their own key events into this enum and pass them to
/// [`SuggestBox::on_key`](crate::SuggestBox::on_key). Keys the control has
/// no use for are reported as unhandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Escape,
    Tab,
    /// Any printable character.
    Character(char),
}

impl Key {
    /// Whether the key moves the highlight in a list.
    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            Key::ArrowUp | Key::ArrowDown | Key::PageUp | Key::PageDown | Key::Home | Key::End
        )
    }
}

/// Payload of the `selection_changed` notification.
///
/// Each side holds at most one item. An empty `removed` means there was no
/// previous selection; an empty `added` means the selection was cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange<T> {
    /// The previously selected item, if any.
    pub removed: Vec<T>,
    /// The newly selected item, if any.
    pub added: Vec<T>,
}

impl<T> SelectionChange<T> {
    pub(crate) fn new(removed: Option<T>, added: Option<T>) -> Self {
        Self {
            removed: removed.into_iter().collect(),
            added: added.into_iter().collect(),
        }
    }
}

/// Every notification a suggestion box sends.
///
/// Pre-events are [`CancelableSignal`]s: any slot returning
/// [`Decision::Cancel`](horizon_suggest_core::Decision::Cancel) vetoes the
/// step they announce.
pub struct SuggestBoxSignals<T: Send + Sync + 'static> {
    /// The display text changed.
    pub text_changed: Signal<Option<String>>,
    /// The selected item changed.
    pub selection_changed: Signal<SelectionChange<T>>,
    /// A population cycle is about to filter for the given search text.
    ///
    /// Canceling hands the cycle to the host, which finishes it with
    /// [`SuggestBox::populate_complete_with`](crate::SuggestBox::populate_complete_with)
    /// or [`SuggestBox::populate_complete`](crate::SuggestBox::populate_complete).
    pub populating: CancelableSignal<String>,
    /// A population cycle produced this view.
    pub populated: Signal<Arc<[T]>>,
    /// The drop-down is about to open.
    pub drop_down_opening: CancelableSignal<()>,
    /// The drop-down opened.
    pub drop_down_opened: Signal<()>,
    /// The drop-down is about to close.
    pub drop_down_closing: CancelableSignal<()>,
    /// The drop-down closed.
    pub drop_down_closed: Signal<()>,
    /// The "add new content" affordance was shown or hidden.
    pub adding_content_visibility_changed: Signal<bool>,
}

impl<T: Send + Sync + 'static> SuggestBoxSignals<T> {
    /// Signals with no slots connected.
    pub fn new() -> Self {
        Self {
            text_changed: Signal::new(),
            selection_changed: Signal::new(),
            populating: CancelableSignal::new(),
            populated: Signal::new(),
            drop_down_opening: CancelableSignal::new(),
            drop_down_opened: Signal::new(),
            drop_down_closing: CancelableSignal::new(),
            drop_down_closed: Signal::new(),
            adding_content_visibility_changed: Signal::new(),
        }
    }

    pub(crate) fn drop_down(&self) -> DropDownSignals<'_> {
        DropDownSignals {
            opening: &self.drop_down_opening,
            opened: &self.drop_down_opened,
            closing: &self.drop_down_closing,
            closed: &self.drop_down_closed,
        }
    }
}

impl<T: Send + Sync + 'static> Default for SuggestBoxSignals<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_change_sides() {
        let change = SelectionChange::new(None, Some("Texas"));
        assert!(change.removed.is_empty());
        assert_eq!(change.added, vec!["Texas"]);

        let cleared = SelectionChange::new(Some("Texas"), None);
        assert_eq!(cleared.removed, vec!["Texas"]);
        assert!(cleared.added.is_empty());
    }

    #[test]
    fn test_navigation_keys() {
        assert!(Key::PageDown.is_navigation());
        assert!(!Key::Enter.is_navigation());
        assert!(!Key::Character('a').is_navigation());
    }
}
