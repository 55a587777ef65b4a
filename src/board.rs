//! Scoreboard lifecycle and the update engine
//!
//! A [`Scoreboard`] owns one viewer's side panel: a display host, a
//! content handler, and the row cache that packs handler entries into
//! native rows. Activating it spawns a periodic tokio task that runs one
//! update cycle per interval; deactivating (or dropping) stops the task
//! and restores the viewer's default display.
//!
//! ## Design Philosophy
//!
//! - **One lock, whole cycle.** All mutable board state lives behind a
//!   single mutex held for the full update cycle, so configuration calls
//!   and cycles never interleave mid-update.
//! - **The handler is the only slow part.** Handlers may block (database
//!   lookups, network calls); the async mode moves the whole cycle onto
//!   the blocking pool so the timer task never stalls the runtime.
//! - **Deactivation is idempotent.** It can come from the embedder, from
//!   `Drop`, or from the cycle itself noticing the viewer is gone; every
//!   path converges on the same teardown.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::handler::ScoreboardHandler;
use crate::host::{DisplayHost, ViewerId};
use crate::markup;
use crate::rows::{RowCache, RowKey, MAX_LINE_CHARS, MAX_SEGMENT_CHARS};

/// One scheduler tick.
pub const TICK: Duration = Duration::from_millis(50);

/// Default update interval, in ticks.
pub const DEFAULT_UPDATE_INTERVAL_TICKS: u64 = 10;

/// Errors from scoreboard configuration and lifecycle calls.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// [`Scoreboard::activate`] was called before a handler was set.
    #[error("scoreboard handler not set")]
    HandlerNotSet,

    /// A setting that is fixed while active was changed on an activated
    /// board.
    #[error("scoreboard is already activated")]
    AlreadyActivated,
}

/// Handler shared between the board and its update task.
pub type SharedHandler = Arc<Mutex<dyn ScoreboardHandler>>;

/// Everything a cycle reads and writes, behind the board's single lock.
struct BoardState<H> {
    host: H,
    handler: Option<SharedHandler>,
    rows: RowCache,
    last_title: Option<String>,
    activated: bool,
}

/// Whether the update task should keep ticking.
#[derive(Debug, PartialEq, Eq)]
enum CycleOutcome {
    Continue,
    Stopped,
}

/// A per-viewer sidebar scoreboard.
///
/// Generic over its [`DisplayHost`] so the same board logic drives a real
/// client integration or the in-memory host used in tests.
pub struct Scoreboard<H: DisplayHost> {
    viewer: ViewerId,
    state: Arc<Mutex<BoardState<H>>>,
    update_interval_ticks: u64,
    run_async: bool,
    task: Option<JoinHandle<()>>,
}

impl<H: DisplayHost> Scoreboard<H> {
    /// Create an inactive scoreboard for `viewer` on `host`.
    ///
    /// Defaults: no handler, a [`DEFAULT_UPDATE_INTERVAL_TICKS`] update
    /// interval, cycles run inline on the timer task.
    pub fn new(viewer: ViewerId, host: H) -> Self {
        Self {
            viewer,
            state: Arc::new(Mutex::new(BoardState {
                host,
                handler: None,
                rows: RowCache::new(),
                last_title: None,
                activated: false,
            })),
            update_interval_ticks: DEFAULT_UPDATE_INTERVAL_TICKS,
            run_async: false,
            task: None,
        }
    }

    /// The viewer this board belongs to.
    #[must_use]
    pub fn viewer(&self) -> &ViewerId {
        &self.viewer
    }

    /// The content handler, if one is set.
    #[must_use]
    pub fn handler(&self) -> Option<SharedHandler> {
        self.state.lock().handler.clone()
    }

    /// Set the content handler. May be called while active; the next
    /// cycle picks it up.
    pub fn set_handler(&mut self, handler: impl ScoreboardHandler + 'static) -> &mut Self {
        self.state.lock().handler = Some(Arc::new(Mutex::new(handler)));
        self
    }

    /// Whether the board is currently active.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.state.lock().activated
    }

    /// The update interval, in ticks.
    #[must_use]
    pub fn update_interval(&self) -> u64 {
        self.update_interval_ticks
    }

    /// Set the update interval, in ticks. Values below 1 are clamped up.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyActivated`] while the board is
    /// active; the interval is fixed for the lifetime of the update task.
    pub fn set_update_interval(&mut self, ticks: u64) -> Result<&mut Self, ConfigError> {
        if self.is_activated() {
            return Err(ConfigError::AlreadyActivated);
        }
        self.update_interval_ticks = ticks.max(1);
        Ok(self)
    }

    /// Whether update cycles run on the blocking pool.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.run_async
    }

    /// Run update cycles on the blocking pool instead of inline on the
    /// timer task. Takes effect on the next activation.
    pub fn set_async(&mut self, run_async: bool) -> &mut Self {
        self.run_async = run_async;
        self
    }

    /// Inspect the display host under the board lock.
    pub fn with_host<R>(&self, f: impl FnOnce(&H) -> R) -> R {
        f(&self.state.lock().host)
    }

    /// Mutate the display host under the board lock.
    ///
    /// The lock also serializes update cycles, so the closure never races
    /// a cycle in progress.
    pub fn with_host_mut<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.state.lock().host)
    }

    /// Stop updates, restore the viewer's default display, and destroy
    /// every allocated group. No-op on an inactive board.
    pub fn deactivate(&mut self) {
        {
            let mut guard = self.state.lock();
            if !guard.activated {
                return;
            }
            deactivate_locked(&mut guard, &self.viewer);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::debug!(viewer = %self.viewer, "scoreboard deactivated");
    }
}

impl<H: DisplayHost + 'static> Scoreboard<H> {
    /// Show the panel to the viewer and start the periodic update task.
    /// No-op on a board that is already active.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HandlerNotSet`] if no handler was set.
    pub fn activate(&mut self) -> Result<(), ConfigError> {
        {
            let mut guard = self.state.lock();
            if guard.activated {
                return Ok(());
            }
            if guard.handler.is_none() {
                return Err(ConfigError::HandlerNotSet);
            }
            guard.activated = true;
            let viewer = self.viewer.clone();
            guard.host.bind_panel(&viewer);
        }

        let ticks = u32::try_from(self.update_interval_ticks).unwrap_or(u32::MAX);
        let period = TICK.saturating_mul(ticks);
        self.task = Some(tokio::spawn(run_update_task(
            Arc::clone(&self.state),
            self.viewer.clone(),
            period,
            self.run_async,
        )));
        tracing::debug!(viewer = %self.viewer, ?period, "scoreboard activated");
        Ok(())
    }
}

impl<H: DisplayHost> Drop for Scoreboard<H> {
    fn drop(&mut self) {
        self.deactivate();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Teardown with the board lock already held.
fn deactivate_locked<H: DisplayHost>(state: &mut BoardState<H>, viewer: &ViewerId) {
    state.activated = false;
    if state.host.is_connected(viewer) {
        state.host.restore_default(viewer);
    }
    let BoardState { host, rows, .. } = state;
    rows.teardown(host);
    state.last_title = None;
}

/// Periodic driver spawned by [`Scoreboard::activate`].
async fn run_update_task<H: DisplayHost + 'static>(
    state: Arc<Mutex<BoardState<H>>>,
    viewer: ViewerId,
    period: Duration,
    run_async: bool,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let outcome = if run_async {
            let state = Arc::clone(&state);
            let cycle_viewer = viewer.clone();
            match tokio::task::spawn_blocking(move || run_cycle(&state, &cycle_viewer)).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    tracing::warn!(%viewer, %error, "update cycle panicked");
                    break;
                }
            }
        } else {
            run_cycle(&state, &viewer)
        };
        if outcome == CycleOutcome::Stopped {
            break;
        }
    }
}

/// One update cycle: query the handler, diff against the previous frame,
/// write the changes.
fn run_cycle<H: DisplayHost>(state: &Mutex<BoardState<H>>, viewer: &ViewerId) -> CycleOutcome {
    let mut guard = state.lock();
    let state = &mut *guard;
    if !state.activated {
        return CycleOutcome::Stopped;
    }
    if !state.host.is_connected(viewer) {
        tracing::debug!(%viewer, "viewer disconnected, deactivating");
        deactivate_locked(state, viewer);
        return CycleOutcome::Stopped;
    }
    let Some(handler) = state.handler.clone() else {
        return CycleOutcome::Continue;
    };
    let mut handler = handler.lock();

    // An empty title is rejected by the host; a bold escape renders as
    // nothing visible while staying non-empty.
    let title = handler
        .title(viewer)
        .unwrap_or_else(|| markup::BOLD.to_string());
    let title = markup::format(&title);
    if state.last_title.as_deref() != Some(title.as_str()) {
        state.host.set_title(&title);
        state.last_title = Some(title);
    }

    let Some(entries) = handler.entries(viewer) else {
        // Deliberate skip; whatever is displayed stays.
        return CycleOutcome::Continue;
    };
    drop(handler);

    // Duplicate visible text must still yield unique row identities.
    // Lines are bucketed by the part that becomes the row name (the tail
    // past the prefix budget); each repeat within a bucket gets the next
    // disambiguation offset.
    let mut appeared: HashMap<String, usize> = HashMap::new();
    let mut touched: HashSet<RowKey> = HashSet::new();
    for entry in &entries {
        // Bucket on what will actually render; text past the line cap
        // cannot contribute to identity.
        let text = markup::truncate_chars(entry.text(), MAX_LINE_CHARS);
        let bucket = if markup::char_len(text) > MAX_SEGMENT_CHARS {
            markup::skip_chars(text, MAX_SEGMENT_CHARS)
        } else {
            text
        };
        let offset = appeared
            .entry(bucket.to_string())
            .and_modify(|seen| *seen += 1)
            .or_insert(0);
        let key = state
            .rows
            .apply(&mut state.host, text, *offset, entry.position());
        touched.insert(key);
    }
    state.rows.sweep(&mut state.host, &touched);
    CycleOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, EntryBuilder};
    use crate::host::MemoryHost;
    use pretty_assertions::assert_eq;

    struct FixedHandler {
        title: Option<String>,
        entries: Option<Vec<Entry>>,
    }

    impl ScoreboardHandler for FixedHandler {
        fn title(&mut self, _viewer: &ViewerId) -> Option<String> {
            self.title.clone()
        }

        fn entries(&mut self, _viewer: &ViewerId) -> Option<Vec<Entry>> {
            self.entries.clone()
        }
    }

    fn fixed(title: &str, lines: &[&str]) -> FixedHandler {
        let mut builder = EntryBuilder::new();
        for line in lines {
            builder = builder.next(*line);
        }
        FixedHandler {
            title: Some(title.to_string()),
            entries: Some(builder.build()),
        }
    }

    fn board() -> Scoreboard<MemoryHost> {
        Scoreboard::new(ViewerId::new("steve"), MemoryHost::new())
    }

    #[test]
    fn test_activate_without_handler_fails() {
        let mut board = board();
        // No runtime needed; the error is raised before any task spawns.
        assert_eq!(board.activate(), Err(ConfigError::HandlerNotSet));
        assert!(!board.is_activated());
    }

    #[tokio::test]
    async fn test_activate_is_idempotent() {
        let mut board = board();
        board.set_handler(fixed("&6Stats", &["line"]));
        board.activate().unwrap();
        assert!(board.is_activated());
        assert_eq!(board.activate(), Ok(()));
        board.deactivate();
    }

    #[tokio::test]
    async fn test_interval_is_fixed_while_active() {
        let mut board = board();
        board.set_update_interval(0).unwrap();
        assert_eq!(board.update_interval(), 1);
        board.set_update_interval(20).unwrap();
        assert_eq!(board.update_interval(), 20);

        board.set_handler(fixed("t", &[]));
        board.activate().unwrap();
        assert_eq!(
            board.set_update_interval(5).err(),
            Some(ConfigError::AlreadyActivated)
        );
        board.deactivate();
        board.set_update_interval(5).unwrap();
    }

    #[test]
    fn test_deactivate_inactive_is_noop() {
        let mut board = board();
        board.deactivate();
        assert!(!board.is_activated());
    }

    #[tokio::test]
    async fn test_cycle_writes_title_and_rows() {
        let mut board = board();
        board.set_handler(fixed("&6Server Stats", &["&aOnline: 12", "short"]));
        board.activate().unwrap();

        let outcome = run_cycle(&board.state, board.viewer());
        assert_eq!(outcome, CycleOutcome::Continue);
        board.with_host(|host| {
            assert!(host.is_bound());
            assert_eq!(host.title(), "§6Server Stats");
            assert_eq!(host.row_count(), 2);
            assert_eq!(host.score("§aOnline: 12"), Some(2));
            assert_eq!(host.score("short"), Some(1));
        });
        board.deactivate();
    }

    #[tokio::test]
    async fn test_missing_title_renders_invisible_placeholder() {
        let mut board = board();
        board.set_handler(FixedHandler {
            title: None,
            entries: Some(Vec::new()),
        });
        board.activate().unwrap();
        run_cycle(&board.state, &ViewerId::new("steve"));
        board.with_host(|host| assert_eq!(host.title(), markup::BOLD));
        board.deactivate();
    }

    #[tokio::test]
    async fn test_none_entries_keeps_previous_frame() {
        let mut board = board();
        board.set_handler(fixed("t", &["keep me"]));
        board.activate().unwrap();
        run_cycle(&board.state, &ViewerId::new("steve"));

        board.set_handler(FixedHandler {
            title: Some("t".to_string()),
            entries: None,
        });
        let outcome = run_cycle(&board.state, &ViewerId::new("steve"));
        assert_eq!(outcome, CycleOutcome::Continue);
        board.with_host(|host| assert_eq!(host.score("keep me"), Some(1)));
        board.deactivate();
    }

    #[tokio::test]
    async fn test_empty_entries_clears_every_row() {
        let mut board = board();
        board.set_handler(fixed("t", &["gone soon"]));
        board.activate().unwrap();
        run_cycle(&board.state, &ViewerId::new("steve"));
        board.with_host(|host| assert_eq!(host.row_count(), 1));

        board.set_handler(fixed("t", &[]));
        run_cycle(&board.state, &ViewerId::new("steve"));
        board.with_host(|host| assert_eq!(host.row_count(), 0));
        board.deactivate();
    }

    #[tokio::test]
    async fn test_disconnected_viewer_stops_the_board() {
        let mut board = board();
        board.set_handler(fixed("t", &["line"]));
        board.activate().unwrap();
        board.with_host_mut(|host| host.set_connected(false));

        let outcome = run_cycle(&board.state, &ViewerId::new("steve"));
        assert_eq!(outcome, CycleOutcome::Stopped);
        assert!(!board.is_activated());
        board.with_host(|host| assert_eq!(host.group_count(), 0));
    }

    #[tokio::test]
    async fn test_duplicate_lines_render_identically() {
        let mut board = board();
        let line = "&7the same line of text shown three times";
        board.set_handler(fixed("t", &[line, line, line]));
        board.activate().unwrap();
        run_cycle(&board.state, &ViewerId::new("steve"));

        board.with_host(|host| {
            assert_eq!(host.row_count(), 3);
            let lines = host.rendered_lines();
            let visible: Vec<&str> = lines.iter().map(|l| l.trim_end()).collect();
            assert_eq!(visible[0], visible[1]);
            assert_eq!(visible[1], visible[2]);
        });
        board.deactivate();
    }

    #[tokio::test]
    async fn test_lines_identical_within_cap_stay_distinct() {
        // Differ only past the line cap: after truncation they are
        // duplicates and must still occupy two rows.
        let base: String = ('a'..='z').cycle().take(48).collect();
        let mut board = board();
        board.set_handler(FixedHandler {
            title: Some("t".to_string()),
            entries: Some(vec![
                Entry::new(format!("{base}A"), 2),
                Entry::new(format!("{base}B"), 1),
            ]),
        });
        board.activate().unwrap();
        run_cycle(&board.state, &ViewerId::new("steve"));
        board.with_host(|host| assert_eq!(host.row_count(), 2));
        board.deactivate();
    }

    #[tokio::test]
    async fn test_title_written_only_on_change() {
        let mut board = board();
        board.set_handler(fixed("&6Stable", &[]));
        board.activate().unwrap();
        run_cycle(&board.state, &ViewerId::new("steve"));
        // Clobber the host title directly; an unchanged handler title
        // must not overwrite it.
        board.with_host_mut(|host| host.set_title("clobbered"));
        run_cycle(&board.state, &ViewerId::new("steve"));
        board.with_host(|host| assert_eq!(host.title(), "clobbered"));

        board.set_handler(fixed("&6Changed", &[]));
        run_cycle(&board.state, &ViewerId::new("steve"));
        board.with_host(|host| assert_eq!(host.title(), "§6Changed"));
        board.deactivate();
    }
}
