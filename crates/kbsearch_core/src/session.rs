use kb_logging::{kb_debug, kb_info};

use crate::conversation::{ConversationLog, SearchFailure, SearchReply};
use crate::messages::Locale;

pub type SearchTicket = u64;

/// Results requested per search.
pub const DEFAULT_TOP_K: usize = 10;
/// Results rendered per answer; the entry keeps the full list.
pub const DISPLAY_RESULTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Application,
    Issue,
    Ingredient,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchFilters {
    pub application: Option<String>,
    pub issue: Option<String>,
    pub ingredient: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.application.is_none() && self.issue.is_none() && self.ingredient.is_none()
    }

    pub fn set(&mut self, field: FilterField, value: Option<String>) {
        let value = value
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());
        match field {
            FilterField::Application => self.application = value,
            FilterField::Issue => self.issue = value,
            FilterField::Ingredient => self.ingredient = value,
        }
    }

    /// Non-empty filters as `(wire name, value)` pairs.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("application", self.application.as_deref()),
            ("issue", self.issue.as_deref()),
            ("ingredient", self.ingredient.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub ticket: SearchTicket,
    pub query: String,
    pub top_k: usize,
    pub filters: SearchFilters,
}

/// Owns the transcript and admits at most one search at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionController {
    log: ConversationLog,
    in_flight: Option<SearchTicket>,
    last_ticket: SearchTicket,
    top_k: usize,
    filters: SearchFilters,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl SessionController {
    pub fn new(top_k: usize) -> Self {
        Self {
            log: ConversationLog::new(),
            in_flight: None,
            last_ticket: 0,
            top_k: top_k.max(1),
            filters: SearchFilters::default(),
        }
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub(crate) fn set_filter(&mut self, field: FilterField, value: Option<String>) {
        self.filters.set(field, value);
    }

    /// Returns the request to send, or `None` when the text is blank or a
    /// search is already running. Dropped submissions are not queued.
    pub(crate) fn submit_query(&mut self, text: &str) -> Option<SearchRequest> {
        let query = text.trim();
        if query.is_empty() {
            return None;
        }
        if let Some(ticket) = self.in_flight {
            kb_debug!("Dropping query while search {} is in flight", ticket);
            return None;
        }

        self.last_ticket += 1;
        let ticket = self.last_ticket;
        self.log.push_user(query.to_string());
        self.in_flight = Some(ticket);
        kb_info!("Search {} submitted query_len={}", ticket, query.len());

        Some(SearchRequest {
            ticket,
            query: query.to_string(),
            top_k: self.top_k,
            filters: self.filters.clone(),
        })
    }

    /// Apply a search completion. Returns `None` if the ticket is not the
    /// one in flight, otherwise whether the search succeeded.
    pub(crate) fn complete(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchReply, SearchFailure>,
        locale: Locale,
    ) -> Option<bool> {
        if self.in_flight != Some(ticket) {
            kb_debug!("Ignoring completion for search {}", ticket);
            return None;
        }
        self.in_flight = None;

        match result {
            Ok(mut reply) => {
                reply.results.truncate(self.top_k);
                kb_info!(
                    "Search {} answered results={} elapsed_ms={}",
                    ticket,
                    reply.results.len(),
                    reply.elapsed_ms
                );
                self.log.push_answer(reply);
                Some(true)
            }
            Err(failure) => {
                kb_info!("Search {} failed: {}", ticket, failure.kind);
                self.log
                    .push_failure(locale.search_failed().to_string(), failure);
                Some(false)
            }
        }
    }
}
