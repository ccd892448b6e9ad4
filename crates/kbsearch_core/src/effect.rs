use crate::{DocumentId, RequestToken, SearchRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Search(SearchRequest),
    RefreshHistory { token: RequestToken, limit: usize },
    LoadFacets { token: RequestToken },
    FetchPreviewUrl {
        token: RequestToken,
        document_id: DocumentId,
    },
    /// Stop waiting for a superseded preview request.
    CancelPreview { token: RequestToken },
    /// Drop whatever was held for a resolved preview.
    ReleasePreview { token: RequestToken },
    /// Credential is gone; show the sign-in entry point.
    ReturnToLogin,
}
