use chrono::{DateTime, Utc};

use crate::latest::{LatestWins, RequestToken};

/// Upper bound on cached history rows.
pub const HISTORY_CAP: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: u64,
    pub query_text: String,
    pub result_count: u32,
    pub submitted_at: DateTime<Utc>,
    pub top_result_score: Option<f64>,
    pub response_time_ms: Option<u64>,
}

/// Read-mostly mirror of the backend's search history.
///
/// Contents only ever come from a backend refresh; nothing is inserted
/// locally. Overlapping refreshes are resolved latest-wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryCache {
    entries: Vec<HistoryEntry>,
    refresh: LatestWins,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most-recent-first, at most [`HISTORY_CAP`] long.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.current().is_some()
    }

    pub(crate) fn begin_refresh(&mut self) -> RequestToken {
        self.refresh.issue()
    }

    /// Replace the cache wholesale. Returns `false` for a stale response.
    pub(crate) fn apply_refresh(&mut self, token: RequestToken, mut rows: Vec<HistoryEntry>) -> bool {
        if !self.refresh.settle(token) {
            return false;
        }
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        rows.truncate(HISTORY_CAP);
        self.entries = rows;
        true
    }

    /// A failed refresh keeps the previous contents.
    pub(crate) fn abandon_refresh(&mut self, token: RequestToken) -> bool {
        self.refresh.settle(token)
    }

    pub fn query_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.query_text.as_str())
    }
}
