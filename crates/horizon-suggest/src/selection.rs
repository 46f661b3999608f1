//! The selection list behind the drop-down.
//!
//! A [`SelectionAdapter`] is the control's view of whatever list presents the
//! filtered candidates. It receives the view after every population cycle,
//! tracks which entry is highlighted, and interprets navigation keys. When
//! the user accepts or abandons the highlight it answers
//! [`AdapterResponse::Commit`] or [`AdapterResponse::Cancel`], and the
//! control runs the matching selection operation.
//!
//! [`ListSelectionAdapter`] is the stock implementation.
//!
//! # Example
//!
//! ```
//! use horizon_suggest::{AdapterResponse, Key, ListSelectionAdapter, SelectionAdapter};
//!
//! let mut list: ListSelectionAdapter<&str> = ListSelectionAdapter::new();
//! list.set_items(vec!["apple", "apricot", "banana"].into());
//!
//! assert_eq!(list.handle_key(Key::ArrowDown), AdapterResponse::Handled);
//! assert_eq!(list.highlighted(), Some("apple"));
//! assert_eq!(list.handle_key(Key::ArrowUp), AdapterResponse::Handled);
//! assert_eq!(list.highlighted(), Some("banana"));
//! assert_eq!(list.handle_key(Key::Enter), AdapterResponse::Commit);
//! ```

use std::sync::Arc;

use horizon_suggest_core::Signal;
use horizon_suggest_core::logging::targets;

use crate::events::Key;

/// How a [`SelectionAdapter`] dealt with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterResponse {
    /// Not interesting to the list; the control may act on it.
    Ignored,
    /// Consumed by the list (the highlight may have moved).
    Handled,
    /// The user accepted the highlighted entry.
    Commit,
    /// The user abandoned the list.
    Cancel,
}

impl AdapterResponse {
    /// Whether the key was consumed.
    pub fn is_handled(self) -> bool {
        self != AdapterResponse::Ignored
    }
}

/// The list that presents the filtered view.
pub trait SelectionAdapter<T> {
    /// Replace the presented entries. Any highlight is dropped.
    fn set_items(&mut self, items: Arc<[T]>);

    /// The highlighted entry.
    fn highlighted(&self) -> Option<T>;

    /// Highlight an entry, or clear the highlight with `None`.
    ///
    /// An item that is not presented clears the highlight.
    fn set_highlighted(&mut self, item: Option<&T>);

    /// Interpret a key press.
    fn handle_key(&mut self, key: Key) -> AdapterResponse;
}

/// A vertical list with keyboard navigation.
///
/// Up and down wrap around. Page keys move by the number of visible rows and
/// stop at the ends. The scroll offset follows the highlight so the
/// highlighted row is always inside [`visible_range`](Self::visible_range).
pub struct ListSelectionAdapter<T: Send + 'static> {
    items: Arc<[T]>,
    highlighted: Option<usize>,
    max_visible_items: usize,
    scroll_offset: usize,

    /// Emitted when the highlight moves.
    pub highlighted_changed: Signal<Option<T>>,
}

impl<T: Clone + PartialEq + Send + 'static> ListSelectionAdapter<T> {
    /// An empty list showing seven rows.
    pub fn new() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            highlighted: None,
            max_visible_items: 7,
            scroll_offset: 0,
            highlighted_changed: Signal::new(),
        }
    }

    /// Set the number of visible rows using builder pattern.
    pub fn with_max_visible_items(mut self, count: usize) -> Self {
        self.set_max_visible_items(count);
        self
    }

    /// The number of visible rows.
    pub fn max_visible_items(&self) -> usize {
        self.max_visible_items
    }

    /// Set the number of visible rows. At least one row is always shown.
    pub fn set_max_visible_items(&mut self, count: usize) {
        self.max_visible_items = count.max(1);
        self.ensure_highlight_visible();
    }

    /// The presented entries.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Index of the highlighted entry.
    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted
    }

    /// The rows currently scrolled into view.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let start = self.scroll_offset;
        let end = (start + self.max_visible_items).min(self.items.len());
        start..end
    }

    /// Move the highlight up, wrapping to the bottom.
    pub fn move_up(&mut self) {
        let Some(last) = self.items.len().checked_sub(1) else {
            return;
        };
        let index = match self.highlighted {
            Some(index) if index > 0 => index - 1,
            _ => last,
        };
        self.highlight_index(Some(index));
    }

    /// Move the highlight down, wrapping to the top.
    pub fn move_down(&mut self) {
        let Some(last) = self.items.len().checked_sub(1) else {
            return;
        };
        let index = match self.highlighted {
            Some(index) if index < last => index + 1,
            _ => 0,
        };
        self.highlight_index(Some(index));
    }

    /// Move the highlight up by one page.
    pub fn page_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let index = self
            .highlighted
            .map_or(0, |index| index.saturating_sub(self.max_visible_items));
        self.highlight_index(Some(index));
    }

    /// Move the highlight down by one page.
    pub fn page_down(&mut self) {
        let Some(last) = self.items.len().checked_sub(1) else {
            return;
        };
        let index = self
            .highlighted
            .map_or(0, |index| (index + self.max_visible_items).min(last));
        self.highlight_index(Some(index));
    }

    /// Highlight the first entry.
    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.highlight_index(Some(0));
        }
    }

    /// Highlight the last entry.
    pub fn select_last(&mut self) {
        if let Some(last) = self.items.len().checked_sub(1) {
            self.highlight_index(Some(last));
        }
    }

    fn highlight_index(&mut self, index: Option<usize>) {
        if self.highlighted == index {
            return;
        }
        self.highlighted = index;
        self.ensure_highlight_visible();
        tracing::trace!(target: targets::SELECTION, ?index, "highlight moved");
        self.highlighted_changed.emit(self.highlighted());
    }

    fn ensure_highlight_visible(&mut self) {
        let Some(index) = self.highlighted else {
            return;
        };
        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if index >= self.scroll_offset + self.max_visible_items {
            self.scroll_offset = index + 1 - self.max_visible_items;
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> SelectionAdapter<T> for ListSelectionAdapter<T> {
    fn set_items(&mut self, items: Arc<[T]>) {
        self.items = items;
        self.scroll_offset = 0;
        self.highlight_index(None);
    }

    fn highlighted(&self) -> Option<T> {
        self.highlighted
            .and_then(|index| self.items.get(index))
            .cloned()
    }

    fn set_highlighted(&mut self, item: Option<&T>) {
        let index = item.and_then(|item| self.items.iter().position(|c| c == item));
        self.highlight_index(index);
    }

    fn handle_key(&mut self, key: Key) -> AdapterResponse {
        match key {
            Key::ArrowUp => self.move_up(),
            Key::ArrowDown => self.move_down(),
            Key::PageUp => self.page_up(),
            Key::PageDown => self.page_down(),
            Key::Home => self.select_first(),
            Key::End => self.select_last(),
            Key::Enter => return AdapterResponse::Commit,
            Key::Escape => return AdapterResponse::Cancel,
            Key::Tab | Key::Character(_) => return AdapterResponse::Ignored,
        }
        AdapterResponse::Handled
    }
}

impl<T: Clone + PartialEq + Send + 'static> Default for ListSelectionAdapter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> std::fmt::Debug for ListSelectionAdapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListSelectionAdapter")
            .field("items", &self.items.len())
            .field("highlighted", &self.highlighted)
            .field("max_visible_items", &self.max_visible_items)
            .field("scroll_offset", &self.scroll_offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn list(items: &[&'static str]) -> ListSelectionAdapter<&'static str> {
        let mut list = ListSelectionAdapter::new();
        list.set_items(Arc::from(items.to_vec()));
        list
    }

    #[test]
    fn test_navigation_wraps() {
        let mut list = list(&["item1", "item2", "item3"]);
        assert_eq!(list.highlighted(), None);

        list.move_down();
        assert_eq!(list.highlighted_index(), Some(0));
        list.move_down();
        list.move_down();
        assert_eq!(list.highlighted_index(), Some(2));

        // Move down wraps to top
        list.move_down();
        assert_eq!(list.highlighted_index(), Some(0));

        // Move up wraps to bottom
        list.move_up();
        assert_eq!(list.highlighted_index(), Some(2));
    }

    #[test]
    fn test_paging_stops_at_ends() {
        let items: Vec<&'static str> = vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
        let mut list = list(&items).with_max_visible_items(3);

        list.page_down();
        assert_eq!(list.highlighted_index(), Some(0));
        list.page_down();
        assert_eq!(list.highlighted_index(), Some(3));
        list.select_last();
        list.page_down();
        assert_eq!(list.highlighted_index(), Some(9));
        list.page_up();
        assert_eq!(list.highlighted_index(), Some(6));
        list.select_first();
        list.page_up();
        assert_eq!(list.highlighted_index(), Some(0));
    }

    #[test]
    fn test_scroll_follows_highlight() {
        let items: Vec<&'static str> = vec!["a", "b", "c", "d", "e", "f"];
        let mut list = list(&items).with_max_visible_items(3);
        assert_eq!(list.visible_range(), 0..3);

        list.set_highlighted(Some(&"e"));
        assert_eq!(list.visible_range(), 2..5);
        list.select_first();
        assert_eq!(list.visible_range(), 0..3);
    }

    #[test]
    fn test_keys_map_to_responses() {
        let mut list = list(&["apple"]);
        assert_eq!(list.handle_key(Key::Home), AdapterResponse::Handled);
        assert_eq!(list.handle_key(Key::Enter), AdapterResponse::Commit);
        assert_eq!(list.handle_key(Key::Escape), AdapterResponse::Cancel);
        assert_eq!(list.handle_key(Key::Character('x')), AdapterResponse::Ignored);
        assert!(!AdapterResponse::Ignored.is_handled());
    }

    #[test]
    fn test_empty_list_navigation_is_noop() {
        let mut list = ListSelectionAdapter::<String>::new();
        list.move_down();
        list.page_up();
        list.select_last();
        assert_eq!(list.highlighted(), None);
    }

    #[test]
    fn test_set_items_clears_highlight() {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let mut list = list(&["apple", "apricot"]);
        let changes_clone = changes.clone();
        list.highlighted_changed
            .connect(move |item| changes_clone.lock().push(*item));

        list.set_highlighted(Some(&"apricot"));
        list.set_items(Arc::from(vec!["banana"]));
        list.set_highlighted(Some(&"apricot"));

        assert_eq!(list.highlighted(), None);
        assert_eq!(*changes.lock(), vec![Some("apricot"), None]);
    }
}
