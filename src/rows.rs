//! Display-row packing and caching
//!
//! The host panel natively shows rows keyed by a name of at most 16
//! characters, and a named group can extend a member row with a prefix
//! and suffix of at most 16 characters each. [`RowCache`] packs a line of
//! up to 48 visible characters into those three fields and keeps every
//! allocated resource reusable across update cycles:
//!
//! - text of 16 characters or fewer becomes a bare row, no group needed;
//! - longer text is split three ways — group prefix, row name, group
//!   suffix — and the group is shared by every line with the same affix
//!   pair, so group count is bounded by the number of *distinct* affix
//!   pairs ever seen, not by entry count or cycle count;
//! - identical visible text in one cycle is disambiguated by an offset
//!   that shifts the split (and, for short text, appends invisible
//!   trailing spaces), keeping row identities unique while rendering the
//!   same characters.
//!
//! Row identities survive a line's disappearance; only the written score
//! is cleared. Groups are destroyed only when the board deactivates.

use std::collections::{HashMap, HashSet};

use crate::host::DisplayHost;
use crate::markup;

/// Maximum visible characters in one line.
pub const MAX_LINE_CHARS: usize = 48;

/// Maximum characters per native field (row name, group prefix, group
/// suffix).
pub const MAX_SEGMENT_CHARS: usize = 16;

/// Generated group names start with this; the trailing number comes from
/// an instance-scoped counter.
const GROUP_NAME_PREFIX: &str = "sp_group_";

/// Unique key of a display row: the (possibly padded) middle segment plus
/// the disambiguation offset it was packed with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowKey {
    /// Row name as written to the host, padding included.
    pub name: String,
    /// Disambiguation offset the row was resolved with.
    pub offset: usize,
}

/// Composite key of a named group: its exact affix pair.
///
/// Groups are matched purely by structural equality of this pair, never
/// by identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AffixKey {
    /// Group prefix, at most [`MAX_SEGMENT_CHARS`] characters.
    pub prefix: String,
    /// Group suffix, at most [`MAX_SEGMENT_CHARS`] characters.
    pub suffix: String,
}

/// One native row identity and its current group binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayRow {
    name: String,
    offset: usize,
    group: Option<String>,
}

impl DisplayRow {
    /// Row name as written to the host.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Disambiguation offset this row was created with.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Name of the group currently extending this row, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Reconstruct the visible line from this row and its group affixes.
    #[must_use]
    pub fn full_text(&self, prefix: &str, suffix: &str) -> String {
        format!("{}{}{}", prefix, self.name, suffix)
    }
}

/// Packs lines into host rows and caches every allocated resource.
///
/// One cache per scoreboard instance; nothing here is shared across
/// viewers.
#[derive(Debug, Default)]
pub struct RowCache {
    /// Row identities ever allocated, by composite key.
    rows: HashMap<RowKey, DisplayRow>,
    /// Group name per distinct affix pair.
    groups: HashMap<AffixKey, String>,
    /// Scores written in the latest cycle, used to spot vanished rows.
    scores: HashMap<RowKey, i32>,
    /// Instance-scoped counter behind generated group names.
    group_seq: u64,
}

impl RowCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack `text` into a row, bind it on the host, and write `score`.
    ///
    /// `offset` is the per-cycle disambiguation counter for this text's
    /// tail bucket; the caller resets it every cycle. Text longer than
    /// [`MAX_LINE_CHARS`] is silently truncated. The returned key is
    /// recorded in the cycle score cache for [`sweep`](Self::sweep).
    pub fn apply<H>(&mut self, host: &mut H, text: &str, offset: usize, score: i32) -> RowKey
    where
        H: DisplayHost + ?Sized,
    {
        let key = self.resolve(host, text, offset);
        if let Some(row) = self.rows.get(&key) {
            host.set_score(&row.name, score);
            tracing::trace!(row = %row.name, score, "wrote row score");
        }
        self.scores.insert(key.clone(), score);
        key
    }

    /// Clear the score of every row written in a previous cycle but
    /// absent from `touched`, and forget it from the score cache.
    ///
    /// The row identities themselves and their group memberships are kept
    /// so a returning line reuses them without reallocation.
    pub fn sweep<H>(&mut self, host: &mut H, touched: &HashSet<RowKey>)
    where
        H: DisplayHost + ?Sized,
    {
        let stale: Vec<RowKey> = self
            .scores
            .keys()
            .filter(|key| !touched.contains(key))
            .cloned()
            .collect();
        for key in stale {
            self.scores.remove(&key);
            if let Some(row) = self.rows.get(&key) {
                host.clear_score(&row.name);
                tracing::debug!(row = %row.name, "cleared vanished row");
            }
        }
    }

    /// Destroy every allocated group and forget all cached state.
    ///
    /// Called on deactivation; the next activation starts from an empty
    /// cache.
    pub fn teardown<H>(&mut self, host: &mut H)
    where
        H: DisplayHost + ?Sized,
    {
        for name in self.groups.values() {
            host.unregister_group(name);
        }
        tracing::debug!(groups = self.groups.len(), rows = self.rows.len(), "tore down row cache");
        self.groups.clear();
        self.rows.clear();
        self.scores.clear();
    }

    /// Number of distinct affix groups allocated.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of row identities allocated.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// A cached row identity, if it exists.
    #[must_use]
    pub fn row(&self, key: &RowKey) -> Option<&DisplayRow> {
        self.rows.get(key)
    }

    /// The score last written for a row, if it is in the current cycle
    /// cache.
    #[must_use]
    pub fn cached_score(&self, key: &RowKey) -> Option<i32> {
        self.scores.get(key).copied()
    }

    /// Resolve text + offset into a bound row identity.
    fn resolve<H>(&mut self, host: &mut H, text: &str, offset: usize) -> RowKey
    where
        H: DisplayHost + ?Sized,
    {
        let text = markup::truncate_chars(text, MAX_LINE_CHARS);
        if markup::char_len(text) <= MAX_SEGMENT_CHARS {
            // Fits in the bare row name; the offset renders as invisible
            // trailing padding so duplicate text still gets a unique key.
            let name = format!("{}{}", text, " ".repeat(offset));
            let key = RowKey { name, offset };
            return self.bind(host, key, None);
        }

        // Reserve offset+1 characters of the prefix budget so shifted
        // splits of the same text stay distinguishable. Clamped so the
        // prefix never empties out entirely.
        let reserve = (offset + 1).min(MAX_SEGMENT_CHARS - 1);
        let prefix = markup::truncate_chars(text, MAX_SEGMENT_CHARS - reserve).to_string();
        let rest = markup::skip_chars(text, MAX_SEGMENT_CHARS - reserve);
        let name = markup::truncate_chars(rest, MAX_SEGMENT_CHARS).to_string();
        // The name segment ends at char 32 - reserve; anything past that
        // must go into the suffix or it would be silently dropped.
        let suffix = if markup::char_len(text) > 2 * MAX_SEGMENT_CHARS - reserve {
            let tail = markup::skip_chars(text, 2 * MAX_SEGMENT_CHARS - reserve);
            markup::truncate_chars(tail, MAX_SEGMENT_CHARS).to_string()
        } else {
            String::new()
        };

        let group = self.group_for(host, prefix, suffix);
        let key = RowKey { name, offset };
        self.bind(host, key, Some(group))
    }

    /// Get the group for an affix pair, registering one on first use.
    fn group_for<H>(&mut self, host: &mut H, prefix: String, suffix: String) -> String
    where
        H: DisplayHost + ?Sized,
    {
        let key = AffixKey { prefix, suffix };
        if let Some(name) = self.groups.get(&key) {
            return name.clone();
        }
        let name = format!("{}{}", GROUP_NAME_PREFIX, self.group_seq);
        self.group_seq += 1;
        host.register_group(&name);
        host.set_group_prefix(&name, &key.prefix);
        host.set_group_suffix(&name, &key.suffix);
        tracing::debug!(group = %name, prefix = %key.prefix, suffix = %key.suffix, "registered affix group");
        self.groups.insert(key, name.clone());
        name
    }

    /// Create or rebind the row identity for `key`.
    ///
    /// A cached row whose bound group differs from `group` is swapped:
    /// removed from the old membership before joining the new one, so a
    /// row is never in two groups at once.
    fn bind<H>(&mut self, host: &mut H, key: RowKey, group: Option<String>) -> RowKey
    where
        H: DisplayHost + ?Sized,
    {
        match self.rows.get_mut(&key) {
            Some(row) => {
                if row.group != group {
                    if let Some(old) = row.group.take() {
                        host.remove_group_member(&old, &key.name);
                    }
                    if let Some(new) = &group {
                        host.add_group_member(new, &key.name);
                    }
                    row.group = group;
                }
            }
            None => {
                if let Some(new) = &group {
                    host.add_group_member(new, &key.name);
                }
                self.rows.insert(
                    key.clone(),
                    DisplayRow {
                        name: key.name.clone(),
                        offset: key.offset,
                        group,
                    },
                );
            }
        }
        key
    }
}
