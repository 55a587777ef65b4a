//! Host display interface
//!
//! The library never talks to a game client directly. Everything it needs
//! from the host — the side-panel display slot, named affix groups, and
//! viewer presence — is behind the [`DisplayHost`] trait, so a board can
//! drive a real client integration or the bundled [`MemoryHost`]
//! interchangeably.
//!
//! [`MemoryHost`] is a complete in-memory implementation: the crate's own
//! tests run against it, and embedders can use it to render boards
//! headlessly or to snapshot what a viewer would see.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Identifies the viewer a scoreboard belongs to.
///
/// The library treats this as an opaque key; the host decides what it
/// names (an account id, a connection id, a player name).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewerId(pub String);

impl ViewerId {
    /// Create a viewer id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ViewerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The host's side-panel display and named-group primitives.
///
/// Rows are keyed by name and sorted by score, highest first. A named
/// group attaches a shared prefix/suffix to its member rows — the text
/// extension trick the packer builds on. All operations are
/// fire-and-forget: the host does not report failures and the library
/// never retries.
pub trait DisplayHost: Send {
    /// Whether the viewer is still connected.
    fn is_connected(&self, viewer: &ViewerId) -> bool;

    /// Show this board's panel to the viewer.
    fn bind_panel(&mut self, viewer: &ViewerId);

    /// Restore the viewer's default display.
    fn restore_default(&mut self, viewer: &ViewerId);

    /// Set the panel title.
    fn set_title(&mut self, title: &str);

    /// Create the row if needed and set its score.
    fn set_score(&mut self, row: &str, score: i32);

    /// Remove a row's score from the panel.
    fn clear_score(&mut self, row: &str);

    /// Register a new named group.
    fn register_group(&mut self, group: &str);

    /// Set a group's prefix.
    fn set_group_prefix(&mut self, group: &str, prefix: &str);

    /// Set a group's suffix.
    fn set_group_suffix(&mut self, group: &str, suffix: &str);

    /// Add a row identity to a group's membership.
    fn add_group_member(&mut self, group: &str, member: &str);

    /// Remove a row identity from a group's membership.
    fn remove_group_member(&mut self, group: &str, member: &str);

    /// Destroy a group and its memberships.
    fn unregister_group(&mut self, group: &str);
}

/// One named group held by [`MemoryHost`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct GroupRecord {
    prefix: String,
    suffix: String,
    members: BTreeSet<String>,
}

/// In-memory [`DisplayHost`] for tests and headless embedding.
///
/// Tracks exactly what a client would render: the bound panel, its title,
/// row scores, and group affixes/memberships, with inspection accessors
/// for all of it.
#[derive(Clone, Debug)]
pub struct MemoryHost {
    connected: bool,
    bound: bool,
    title: String,
    scores: HashMap<String, i32>,
    groups: HashMap<String, GroupRecord>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            connected: true,
            bound: false,
            title: String::new(),
            scores: HashMap::new(),
            groups: HashMap::new(),
        }
    }
}

impl MemoryHost {
    /// Create a host with a connected viewer and no panel bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the viewer connecting or disconnecting.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Whether this board's panel is currently shown to the viewer.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// The current panel title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Score of a row, if it has one.
    #[must_use]
    pub fn score(&self, row: &str) -> Option<i32> {
        self.scores.get(row).copied()
    }

    /// Number of rows with a score.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.scores.len()
    }

    /// Number of registered groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// The group a row belongs to, if any.
    #[must_use]
    pub fn group_of(&self, member: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, record)| record.members.contains(member))
            .map(|(name, _)| name.as_str())
    }

    /// A group's prefix and suffix.
    #[must_use]
    pub fn group_affixes(&self, group: &str) -> Option<(&str, &str)> {
        self.groups
            .get(group)
            .map(|record| (record.prefix.as_str(), record.suffix.as_str()))
    }

    /// Rows and scores, sorted the way the panel shows them: score
    /// descending, name ascending on ties.
    #[must_use]
    pub fn rows(&self) -> Vec<(String, i32)> {
        let mut rows: Vec<(String, i32)> = self
            .scores
            .iter()
            .map(|(name, score)| (name.clone(), *score))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows
    }

    /// The visible line for each row, top to bottom: group prefix + row
    /// name + group suffix, exactly as the client composes it.
    #[must_use]
    pub fn rendered_lines(&self) -> Vec<String> {
        self.rows()
            .into_iter()
            .map(|(name, _)| match self.group_of(&name) {
                Some(group) => {
                    let record = &self.groups[group];
                    format!("{}{}{}", record.prefix, name, record.suffix)
                }
                None => name,
            })
            .collect()
    }
}

impl DisplayHost for MemoryHost {
    fn is_connected(&self, _viewer: &ViewerId) -> bool {
        self.connected
    }

    fn bind_panel(&mut self, _viewer: &ViewerId) {
        self.bound = true;
    }

    fn restore_default(&mut self, _viewer: &ViewerId) {
        self.bound = false;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_score(&mut self, row: &str, score: i32) {
        self.scores.insert(row.to_string(), score);
    }

    fn clear_score(&mut self, row: &str) {
        self.scores.remove(row);
    }

    fn register_group(&mut self, group: &str) {
        self.groups.insert(group.to_string(), GroupRecord::default());
    }

    fn set_group_prefix(&mut self, group: &str, prefix: &str) {
        if let Some(record) = self.groups.get_mut(group) {
            record.prefix = prefix.to_string();
        }
    }

    fn set_group_suffix(&mut self, group: &str, suffix: &str) {
        if let Some(record) = self.groups.get_mut(group) {
            record.suffix = suffix.to_string();
        }
    }

    fn add_group_member(&mut self, group: &str, member: &str) {
        if let Some(record) = self.groups.get_mut(group) {
            record.members.insert(member.to_string());
        }
    }

    fn remove_group_member(&mut self, group: &str, member: &str) {
        if let Some(record) = self.groups.get_mut(group) {
            record.members.remove(member);
        }
    }

    fn unregister_group(&mut self, group: &str) {
        self.groups.remove(group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_viewer_id_display() {
        let viewer = ViewerId::new("steve");
        assert_eq!(viewer.as_str(), "steve");
        assert_eq!(viewer.to_string(), "steve");
    }

    #[test]
    fn test_memory_host_panel_binding() {
        let viewer = ViewerId::new("v");
        let mut host = MemoryHost::new();
        assert!(!host.is_bound());
        host.bind_panel(&viewer);
        assert!(host.is_bound());
        host.restore_default(&viewer);
        assert!(!host.is_bound());
    }

    #[test]
    fn test_memory_host_rows_sorted_by_score() {
        let mut host = MemoryHost::new();
        host.set_score("low", 1);
        host.set_score("high", 9);
        host.set_score("mid", 5);
        let names: Vec<String> = host.rows().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_memory_host_groups() {
        let mut host = MemoryHost::new();
        host.register_group("g0");
        host.set_group_prefix("g0", "pre");
        host.set_group_suffix("g0", "post");
        host.add_group_member("g0", "row");
        assert_eq!(host.group_affixes("g0"), Some(("pre", "post")));
        assert_eq!(host.group_of("row"), Some("g0"));

        host.remove_group_member("g0", "row");
        assert_eq!(host.group_of("row"), None);

        host.unregister_group("g0");
        assert_eq!(host.group_count(), 0);
    }

    #[test]
    fn test_memory_host_rendered_lines_compose_affixes() {
        let mut host = MemoryHost::new();
        host.register_group("g0");
        host.set_group_prefix("g0", "The quick ");
        host.set_group_suffix("g0", " the lazy dog");
        host.add_group_member("g0", "brown fox jumps over");
        host.set_score("brown fox jumps over", 2);
        host.set_score("plain", 1);
        assert_eq!(
            host.rendered_lines(),
            vec![
                "The quick brown fox jumps over the lazy dog".to_string(),
                "plain".to_string()
            ]
        );
    }

    #[test]
    fn test_memory_host_clear_score_keeps_groups() {
        let mut host = MemoryHost::new();
        host.register_group("g0");
        host.set_score("row", 3);
        host.clear_score("row");
        assert_eq!(host.score("row"), None);
        assert_eq!(host.group_count(), 1);
    }
}
