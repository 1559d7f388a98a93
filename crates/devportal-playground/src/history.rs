use std::collections::VecDeque;

use url::Url;

use crate::model::HistoryEntry;
use crate::request::{RequestState, RowList};

/// Maximum number of entries kept.
pub const HISTORY_LIMIT: usize = 30;

/// Bounded, most-recent-first log of past executions.
///
/// Entries are immutable once pushed. The only way to remove one is to
/// clear the whole log or let it fall off the end.
#[derive(Debug)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Prepend an entry, evicting the oldest beyond the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-hydrate `state` from `entry`.
    ///
    /// The method is always restored. Base URL, path and query rows are only
    /// touched when the recorded URL parses. Headers and body are left alone.
    pub fn replay_into(state: &mut RequestState, entry: &HistoryEntry) {
        state.method = entry.method;

        let Ok(parsed) = Url::parse(&entry.url) else {
            tracing::debug!(url = %entry.url, "history entry URL did not parse, replay kept current URL");
            return;
        };

        let current_base = state.base_url.trim_end_matches('/');
        match strip_base(&entry.url, current_base) {
            Some(rest) => {
                // Empty when the recorded URL is the bare base URL.
                state.path = rest.split(['?', '#']).next().unwrap_or_default().to_string();
            }
            None => {
                state.base_url = parsed.origin().ascii_serialization();
                state.path = parsed.path().to_string();
            }
        }

        state.query_params = RowList::from_pairs(
            parsed
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }
}

/// Remainder of `url` after `base`, if `base` ends on a path boundary.
fn strip_base<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    if base.is_empty() {
        return None;
    }
    let rest = url.strip_prefix(base)?;
    match rest.chars().next() {
        None | Some('/') | Some('?') | Some('#') => Some(rest),
        _ => None,
    }
}
