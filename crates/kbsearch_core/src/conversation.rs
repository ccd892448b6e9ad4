use std::fmt;

pub type EntryId = u64;
pub type DocumentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Business tags attached to an indexed source row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassificationTags {
    pub application: Option<String>,
    pub issue: Option<String>,
    pub ingredient: Option<String>,
}

/// Where inside the source workbook a result came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceDetails {
    pub customer: Option<String>,
    pub trial_id: Option<String>,
    pub sheet_name: Option<String>,
}

/// One ranked source excerpt returned with an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub id: String,
    pub document_id: DocumentId,
    pub filename: String,
    pub tags: ClassificationTags,
    pub source: SourceDetails,
    pub preview_text: String,
    pub relevance_score: f64,
    pub reranker_score: Option<f64>,
    pub viewing_hint: Option<String>,
}

/// Answer produced by the search backend for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReply {
    pub answer: String,
    pub results: Vec<ResultItem>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailureKind {
    Unauthorized,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
    Cancelled,
}

impl fmt::Display for SearchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchFailureKind::Unauthorized => write!(f, "unauthorized"),
            SearchFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            SearchFailureKind::Timeout => write!(f, "timeout"),
            SearchFailureKind::Network => write!(f, "network error"),
            SearchFailureKind::InvalidResponse => write!(f, "invalid response"),
            SearchFailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Structured record of a failed search. Kept on the transcript entry for
/// diagnostics; the user only ever sees the generic message.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFailure {
    pub kind: SearchFailureKind,
    pub detail: Option<String>,
}

impl SearchFailure {
    pub fn new(kind: SearchFailureKind, detail: Option<String>) -> Self {
        Self { kind, detail }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub id: EntryId,
    pub role: Role,
    pub text: String,
    pub results: Option<Vec<ResultItem>>,
    pub elapsed_ms: Option<u64>,
    pub failure: Option<SearchFailure>,
}

impl ConversationEntry {
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Append-only transcript. Entries are never removed or reordered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
    next_id: EntryId,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&ConversationEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub(crate) fn push_user(&mut self, text: String) -> EntryId {
        self.push(ConversationEntry {
            id: 0,
            role: Role::User,
            text,
            results: None,
            elapsed_ms: None,
            failure: None,
        })
    }

    pub(crate) fn push_answer(&mut self, reply: SearchReply) -> EntryId {
        self.push(ConversationEntry {
            id: 0,
            role: Role::Assistant,
            text: reply.answer,
            results: Some(reply.results),
            elapsed_ms: Some(reply.elapsed_ms),
            failure: None,
        })
    }

    pub(crate) fn push_failure(&mut self, text: String, failure: SearchFailure) -> EntryId {
        self.push(ConversationEntry {
            id: 0,
            role: Role::Assistant,
            text,
            results: None,
            elapsed_ms: None,
            failure: Some(failure),
        })
    }

    fn push(&mut self, mut entry: ConversationEntry) -> EntryId {
        self.next_id += 1;
        entry.id = self.next_id;
        self.entries.push(entry);
        self.next_id
    }
}
