//! # scorepanel
//!
//! Per-viewer sidebar scoreboards with long lines, animated text, and a
//! self-stopping update loop.
//!
//! The host panel this library targets shows at most 16 characters per
//! row natively. `scorepanel` packs lines of up to 48 characters into a
//! row name plus the prefix and suffix of a shared named group, reuses
//! those groups across lines and update cycles, and keeps duplicate
//! visible text on distinct rows. Content comes from a
//! [`ScoreboardHandler`] callback queried once per cycle by a periodic
//! tokio task.
//!
//! ## Architecture
//!
//! ```text
//! ScoreboardHandler ──▶ Scoreboard ──▶ RowCache ──▶ DisplayHost
//!   (title/entries)     (lifecycle,     (packing,     (panel, groups,
//!    per cycle)          update task)    reuse, diff)   viewer presence)
//! ```
//!
//! - [`board::Scoreboard`] — lifecycle controller and update engine
//! - [`rows::RowCache`] — line packing and display-resource caching
//! - [`host::DisplayHost`] — host integration seam; [`host::MemoryHost`]
//!   is the bundled in-memory implementation
//! - [`handler::ScoreboardHandler`] — content callback
//! - [`entry`] — frame lines and the position-assigning builder
//! - [`animate`] — animated string generators for titles and lines
//! - [`markup`] — `&x` → `§x` color markup
//!
//! ## Quick Start
//!
//! ```ignore
//! use scorepanel::{
//!     Entry, EntryBuilder, MemoryHost, Scoreboard, ScoreboardHandler, ViewerId,
//! };
//!
//! struct StatsHandler;
//!
//! impl ScoreboardHandler for StatsHandler {
//!     fn title(&mut self, _viewer: &ViewerId) -> Option<String> {
//!         Some("&6Server Stats".to_string())
//!     }
//!
//!     fn entries(&mut self, _viewer: &ViewerId) -> Option<Vec<Entry>> {
//!         Some(
//!             EntryBuilder::new()
//!                 .next("&aOnline: 12")
//!                 .blank()
//!                 .next("&7Map: skylands")
//!                 .build(),
//!         )
//!     }
//! }
//!
//! # async fn run() {
//! let mut board = Scoreboard::new(ViewerId::new("steve"), MemoryHost::new());
//! board.set_handler(StatsHandler);
//! board.activate().expect("handler is set");
//! // ... later
//! board.deactivate();
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animate;
pub mod board;
pub mod entry;
pub mod handler;
pub mod host;
pub mod markup;
pub mod rows;

// Lifecycle
pub use board::{ConfigError, Scoreboard, SharedHandler, DEFAULT_UPDATE_INTERVAL_TICKS, TICK};

// Content
pub use entry::{Entry, EntryBuilder};
pub use handler::ScoreboardHandler;

// Host integration
pub use host::{DisplayHost, MemoryHost, ViewerId};

// Packing
pub use rows::{AffixKey, DisplayRow, RowCache, RowKey, MAX_LINE_CHARS, MAX_SEGMENT_CHARS};

// Animation
pub use animate::{AnimatedText, FrameSequence, HighlightedText, ScrollingText, StaticText};
