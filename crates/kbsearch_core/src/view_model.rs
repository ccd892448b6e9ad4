use url::Url;

use crate::session::DISPLAY_RESULTS;
use crate::{ClassificationTags, DocumentId, EntryId, PreviewState, Role, SearchFilters, SessionState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionViewModel {
    pub entries: Vec<EntryView>,
    pub busy: bool,
    pub pending_input: String,
    pub can_submit: bool,
    /// Example prompts, only offered while the transcript is empty.
    pub examples: Vec<String>,
    pub history: Vec<HistoryRowView>,
    pub filters: SearchFilters,
    pub preview: PreviewView,
    pub signed_out: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    pub id: EntryId,
    pub role: Role,
    pub text: String,
    pub results: Vec<ResultRowView>,
    pub total_results: usize,
    pub elapsed_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRowView {
    pub document_id: DocumentId,
    pub filename: String,
    pub tags: ClassificationTags,
    pub preview_text: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub query: String,
    pub result_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewView {
    #[default]
    Hidden,
    Loading { filename: String },
    Ready { filename: String, url: Url },
    Failed { filename: String, reason: String },
}

impl SessionViewModel {
    pub(crate) fn build(state: &SessionState) -> Self {
        let log = state.conversation();
        let entries = log
            .entries()
            .iter()
            .map(|entry| {
                let all = entry.results.as_deref().unwrap_or_default();
                EntryView {
                    id: entry.id,
                    role: entry.role,
                    text: entry.text.clone(),
                    results: all
                        .iter()
                        .take(DISPLAY_RESULTS)
                        .map(|item| ResultRowView {
                            document_id: item.document_id,
                            filename: item.filename.clone(),
                            tags: item.tags.clone(),
                            preview_text: item.preview_text.clone(),
                            score: item.relevance_score,
                        })
                        .collect(),
                    total_results: all.len(),
                    elapsed_ms: entry.elapsed_ms,
                }
            })
            .collect();

        let examples = if log.is_empty() {
            state
                .locale()
                .example_queries()
                .iter()
                .map(|example| (*example).to_string())
                .collect()
        } else {
            Vec::new()
        };

        let preview = match state.preview().state() {
            PreviewState::Idle => PreviewView::Hidden,
            PreviewState::Loading { filename, .. } => PreviewView::Loading {
                filename: filename.clone(),
            },
            PreviewState::Ready { filename, url, .. } => PreviewView::Ready {
                filename: filename.clone(),
                url: url.clone(),
            },
            PreviewState::Failed {
                filename, reason, ..
            } => PreviewView::Failed {
                filename: filename.clone(),
                reason: reason.clone(),
            },
        };

        Self {
            entries,
            busy: state.is_busy(),
            pending_input: state.pending_input().to_string(),
            can_submit: !state.is_busy() && !state.pending_input().trim().is_empty(),
            examples,
            history: state
                .history()
                .entries()
                .iter()
                .map(|row| HistoryRowView {
                    query: row.query_text.clone(),
                    result_count: row.result_count,
                })
                .collect(),
            filters: state.session().filters().clone(),
            preview,
            signed_out: state.is_signed_out(),
        }
    }
}
