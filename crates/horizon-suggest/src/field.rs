//! The editable text field's contents and selection.
//!
//! The control's display text and what the editor shows are normally the
//! same string, but they are written through different paths: the host
//! reports keystrokes into the field, while the control writes the display
//! text when it completes or restores a selection. [`TextField`] is the
//! control-side mirror of the editor.

use std::ops::Range;

/// Editor text plus the selected byte range.
///
/// The selection is always clamped to character boundaries. An empty range
/// is a caret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    text: String,
    selection: Range<usize>,
}

impl TextField {
    /// A field holding `text` with the caret at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            selection: end..end,
        }
    }

    /// The editor text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text and put the caret at the end.
    ///
    /// Writing the text the field already holds keeps the selection. Returns
    /// `true` if the text changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        self.clear_selection();
        true
    }

    /// The selected byte range.
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// The selected text.
    pub fn selected_text(&self) -> &str {
        &self.text[self.selection.clone()]
    }

    /// Number of selected bytes.
    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Select a range, clamped to the text and to character boundaries.
    pub fn select(&mut self, range: Range<usize>) {
        let start = self.floor_boundary(range.start);
        let end = self.floor_boundary(range.end).max(start);
        self.selection = start..end;
    }

    /// Select the whole text.
    pub fn select_all(&mut self) {
        self.selection = 0..self.text.len();
    }

    /// Collapse the selection to a caret at the end of the text.
    pub fn clear_selection(&mut self) {
        let end = self.text.len();
        self.selection = end..end;
    }

    fn floor_boundary(&self, index: usize) -> usize {
        let mut index = index.min(self.text.len());
        while !self.text.is_char_boundary(index) {
            index -= 1;
        }
        index
    }
}
