//! Scoreboard lines and the entry builder
//!
//! A scoreboard frame is an ordered list of [`Entry`] values: resolved
//! text plus the integer position the host sorts by (highest first).
//! Handlers usually don't compute positions themselves — [`EntryBuilder`]
//! appends lines top-to-bottom and reverses the indices so the first line
//! added lands at the top of the panel.

use serde::{Deserialize, Serialize};

use crate::markup;
use crate::rows::MAX_LINE_CHARS;

/// One line of a scoreboard frame.
///
/// The text is markup-resolved at construction. Entries carry no
/// cross-cycle identity; handlers produce a fresh list every update cycle
/// and the row cache takes care of reusing display resources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    text: String,
    position: i32,
}

impl Entry {
    /// Create an entry, resolving `&x` markup in the text.
    pub fn new(text: impl Into<String>, position: i32) -> Self {
        Self {
            text: markup::format(&text.into()),
            position,
        }
    }

    /// The resolved line text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The score position the host sorts by.
    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Replace the line text, resolving markup.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = markup::format(&text.into());
    }

    /// Replace the score position.
    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

/// Builds an ordered list of entries without hand-computing positions.
///
/// Lines are appended top-to-bottom; [`build`](Self::build) assigns
/// descending positions (`line_count - index`) so the first appended line
/// gets the highest score and shows at the top.
#[derive(Debug, Default)]
pub struct EntryBuilder {
    entries: Vec<Entry>,
}

impl EntryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blank line.
    #[must_use]
    pub fn blank(self) -> Self {
        self.next("")
    }

    /// Append a line with the given text.
    ///
    /// The text is truncated to the 48-character line cap and its markup
    /// resolved.
    #[must_use]
    pub fn next(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let adapted = markup::truncate_chars(&text, MAX_LINE_CHARS);
        // Stash the insertion index; build() reverses it into a position.
        let index = i32::try_from(self.entries.len()).unwrap_or(i32::MAX);
        self.entries.push(Entry::new(adapted, index));
        self
    }

    /// Finish the list, reversing insertion indices into descending
    /// positions.
    #[must_use]
    pub fn build(mut self) -> Vec<Entry> {
        let count = i32::try_from(self.entries.len()).unwrap_or(i32::MAX);
        for entry in &mut self.entries {
            entry.position = count - entry.position;
        }
        self.entries
    }
}
