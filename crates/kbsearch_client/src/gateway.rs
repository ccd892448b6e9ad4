use kbsearch_core::{DocumentId, Facets, HistoryEntry, SearchReply, SearchRequest};
use url::Url;

use crate::GatewayError;

/// Search backend: answers, the user's history and filter facets.
#[async_trait::async_trait]
pub trait SearchGateway: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchReply, GatewayError>;

    /// Most recent queries, newest first.
    async fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, GatewayError>;

    async fn facets(&self) -> Result<Facets, GatewayError>;
}

/// Issues short-lived viewing URLs for source documents.
#[async_trait::async_trait]
pub trait DocumentGateway: Send + Sync {
    async fn download_url(&self, document_id: DocumentId) -> Result<Url, GatewayError>;
}
