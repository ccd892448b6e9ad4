use url::Url;

use crate::{
    DocumentId, Facets, FilterField, HistoryEntry, PreviewFailure, RequestToken, SearchFailure,
    SearchReply, SearchTicket,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Session opened; load history and facets.
    SessionStarted,
    /// A fresh credential was stored after login.
    SignedIn,
    /// User edited the query input.
    InputChanged(String),
    /// User submitted the current query input.
    QuerySubmitted,
    /// Gateway completion for a search.
    SearchCompleted {
        ticket: SearchTicket,
        result: Result<SearchReply, SearchFailure>,
    },
    /// Gateway completion for a history refresh.
    HistoryLoaded {
        token: RequestToken,
        result: Result<Vec<HistoryEntry>, String>,
    },
    /// User picked a history row; copies its query into the input.
    HistorySelected { index: usize },
    /// User picked one of the example prompts.
    ExampleSelected { index: usize },
    /// User set or cleared one search filter.
    FilterChanged {
        field: FilterField,
        value: Option<String>,
    },
    /// Gateway completion for the facet lists.
    FacetsLoaded {
        token: RequestToken,
        result: Result<Facets, String>,
    },
    /// User asked to preview the source file of a result.
    PreviewRequested {
        document_id: DocumentId,
        filename: String,
    },
    /// Gateway completion for a preview URL.
    PreviewResolved {
        token: RequestToken,
        result: Result<Url, PreviewFailure>,
    },
    /// User dismissed the preview.
    PreviewClosed,
    /// Some request was rejected with an authorization failure.
    AuthorizationFailed,
    /// Fallback for placeholder wiring.
    NoOp,
}
