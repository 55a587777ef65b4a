//! Content handler callbacks
//!
//! A [`ScoreboardHandler`] decides what a viewer's board shows. The update
//! engine queries it once per cycle; the handler owns whatever state it
//! needs (animated text sources, game state lookups) and may mutate it
//! while answering.

use crate::entry::Entry;
use crate::host::ViewerId;

/// Decides the title and entries of a scoreboard, one viewer at a time.
pub trait ScoreboardHandler: Send {
    /// The title to display for this viewer.
    ///
    /// Returning `None` renders a bold placeholder instead of an empty
    /// title, which the host rejects.
    fn title(&mut self, viewer: &ViewerId) -> Option<String>;

    /// The ordered entries to display for this viewer.
    ///
    /// Returning `None` skips entry processing for this cycle and leaves
    /// the previously displayed lines untouched — a deliberate no-op
    /// signal distinct from returning an empty list, which clears every
    /// line.
    fn entries(&mut self, viewer: &ViewerId) -> Option<Vec<Entry>>;
}
