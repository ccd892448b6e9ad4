use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use kb_logging::{kb_debug, kb_warn};
use kbsearch_core::{DocumentId, Facets, HistoryEntry, SearchReply, SearchRequest};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Credentials;
use crate::convert::{map_facets, map_history, map_reply};
use crate::gateway::{DocumentGateway, SearchGateway};
use crate::types::{
    DownloadUrlResponse, SearchBody, SearchResponse, TokenResponse, WireFacets, WireHistoryItem,
};
use crate::{FailureKind, GatewayError};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API root, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            // Answer synthesis on the backend is slow.
            request_timeout: Duration::from_secs(120),
            max_bytes: 8 * 1024 * 1024,
        }
    }
}

/// JSON-over-HTTP client for the search backend.
///
/// Every request carries the bearer token from the injected
/// [`Credentials`]. A 401 response discards that token.
#[derive(Clone)]
pub struct HttpGateway {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
    credentials: Arc<dyn Credentials>,
}

impl HttpGateway {
    pub fn new(
        settings: ClientSettings,
        credentials: Arc<dyn Credentials>,
    ) -> Result<Self, GatewayError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| GatewayError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| GatewayError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
            credentials,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Exchange a username and password for a bearer token and store it.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), GatewayError> {
        let url = self.endpoint("auth/login")?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", username)
            .append_pair("password", password)
            .finish();
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form);

        let token: TokenResponse = self.fetch_json(request).await?;
        self.credentials.store(token.access_token);
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|err| GatewayError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let body = self.send(request).await?;
        serde_json::from_slice(&body)
            .map_err(|err| GatewayError::new(FailureKind::Decode, err.to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, GatewayError> {
        let request = match self.credentials.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return self.read_body(response).await;
        }

        let body = self.read_body(response).await.unwrap_or_default();
        let detail = error_detail(&body);
        if status == StatusCode::UNAUTHORIZED {
            kb_warn!("Backend rejected credential");
            self.credentials.discard();
            return Err(
                GatewayError::new(FailureKind::Unauthorized, status.to_string()).with_detail(detail),
            );
        }
        kb_debug!("Backend returned {} detail={:?}", status, detail);
        Err(GatewayError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
            .with_detail(detail))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, GatewayError> {
        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(GatewayError::new(
                FailureKind::TooLarge { max_bytes },
                "response too large",
            ));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(GatewayError::new(
                    FailureKind::TooLarge { max_bytes },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl SearchGateway for HttpGateway {
    async fn search(&self, request: &SearchRequest) -> Result<SearchReply, GatewayError> {
        let filters = if request.filters.is_empty() {
            None
        } else {
            Some(request.filters.pairs().into_iter().collect())
        };
        let body = serde_json::to_vec(&SearchBody {
            query: &request.query,
            top_k: request.top_k,
            filters,
        })
        .map_err(|err| GatewayError::new(FailureKind::Decode, err.to_string()))?;

        let http = self
            .client
            .post(self.endpoint("search")?)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response: SearchResponse = self.fetch_json(http).await?;
        Ok(map_reply(response))
    }

    async fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, GatewayError> {
        let mut url = self.endpoint("search/history")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let rows: Vec<WireHistoryItem> = self.fetch_json(self.client.get(url)).await?;
        map_history(rows)
    }

    async fn facets(&self) -> Result<Facets, GatewayError> {
        let url = self.endpoint("search/facets")?;
        let facets: WireFacets = self.fetch_json(self.client.get(url)).await?;
        Ok(map_facets(facets))
    }
}

#[async_trait::async_trait]
impl DocumentGateway for HttpGateway {
    async fn download_url(&self, document_id: DocumentId) -> Result<Url, GatewayError> {
        let url = self.endpoint(&format!("documents/{document_id}/download-url"))?;
        let response: DownloadUrlResponse = self.fetch_json(self.client.get(url)).await?;
        Url::parse(&response.download_url)
            .map_err(|err| GatewayError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

/// Pull the `detail` text out of an error body. Validation errors carry a
/// structured detail, which is kept as its JSON text.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        return GatewayError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return GatewayError::new(FailureKind::Decode, err.to_string());
    }
    GatewayError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::error_detail;

    #[test]
    fn extracts_string_detail() {
        let body = br#"{"detail":"file is processing"}"#;
        assert_eq!(error_detail(body).as_deref(), Some("file is processing"));
    }

    #[test]
    fn keeps_structured_detail_as_json() {
        let body = br#"{"detail":[{"loc":["query"],"msg":"field required"}]}"#;
        assert!(error_detail(body).unwrap().contains("field required"));
    }

    #[test]
    fn missing_or_invalid_body_has_no_detail() {
        assert_eq!(error_detail(b"<html>502</html>"), None);
        assert_eq!(error_detail(br#"{"message":"x"}"#), None);
    }
}
