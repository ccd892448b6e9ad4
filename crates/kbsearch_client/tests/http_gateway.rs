use std::sync::Arc;
use std::time::Duration;

use kbsearch_client::{
    preview_failure, ClientSettings, Credentials, DocumentGateway, FailureKind, HttpGateway,
    MemoryCredentials, SearchGateway,
};
use kbsearch_core::{PreviewFailureKind, SearchFilters, SearchRequest};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer, creds: &MemoryCredentials) -> HttpGateway {
    let settings = ClientSettings {
        base_url: format!("{}/api", server.uri()),
        ..ClientSettings::default()
    };
    HttpGateway::new(settings, Arc::new(creds.clone())).expect("gateway")
}

fn request(query: &str) -> SearchRequest {
    SearchRequest {
        ticket: 1,
        query: query.into(),
        top_k: 10,
        filters: SearchFilters::default(),
    }
}

#[tokio::test]
async fn search_posts_query_with_bearer_and_maps_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({"query": "apple preserve", "top_k": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "apple preserve",
            "response": "Add pectin before heating.",
            "total_results": 1,
            "response_time_ms": 1520,
            "results": [{
                "id": "12_3",
                "document_id": 12,
                "filename": "apple.xlsx",
                "application": "jam",
                "issue": "heat resistance",
                "ingredient": null,
                "customer": "Acme",
                "trial_id": "T-9",
                "sheet_name": "Sheet1",
                "content_preview": "pectin 0.5%",
                "score": 0.91,
                "reranker_score": 2.4,
                "blob_url": null
            }]
        })))
        .mount(&server)
        .await;

    let creds = MemoryCredentials::with_token("secret");
    let reply = gateway(&server, &creds)
        .search(&request("apple preserve"))
        .await
        .expect("search ok");

    assert_eq!(reply.answer, "Add pectin before heating.");
    assert_eq!(reply.elapsed_ms, 1520);
    assert_eq!(reply.results.len(), 1);
    let item = &reply.results[0];
    assert_eq!(item.document_id, 12);
    assert_eq!(item.tags.application.as_deref(), Some("jam"));
    assert_eq!(item.source.trial_id.as_deref(), Some("T-9"));
    assert_eq!(item.reranker_score, Some(2.4));
}

#[tokio::test]
async fn search_sends_filters_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_string_contains(r#""filters":{"ingredient":"starch"}"#))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "ok", "results": [], "response_time_ms": 5})),
        )
        .mount(&server)
        .await;

    let mut search = request("sauce");
    search.filters.ingredient = Some("starch".into());
    let reply = gateway(&server, &MemoryCredentials::new())
        .search(&search)
        .await
        .expect("search ok");
    assert!(reply.results.is_empty());
}

#[tokio::test]
async fn history_passes_limit_and_reads_naive_timestamps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/history"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "query": "donut oil", "results_count": 10, "top_result_score": 0.7,
             "response_time_ms": 800, "created_at": "2024-06-03T09:00:00.123456"},
            {"id": 1, "query": "carbonara", "results_count": 4, "top_result_score": null,
             "response_time_ms": 900, "created_at": "2024-06-03T08:00:00"}
        ])))
        .mount(&server)
        .await;

    let rows = gateway(&server, &MemoryCredentials::new())
        .history(20)
        .await
        .expect("history ok");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].query_text, "donut oil");
    assert!(rows[0].submitted_at > rows[1].submitted_at);
}

#[tokio::test]
async fn facets_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/facets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applications": ["jam"], "issues": [], "ingredients": ["starch", "pectin"]
        })))
        .mount(&server)
        .await;

    let facets = gateway(&server, &MemoryCredentials::new())
        .facets()
        .await
        .expect("facets ok");
    assert_eq!(facets.applications, vec!["jam".to_string()]);
    assert_eq!(facets.ingredients.len(), 2);
}

#[tokio::test]
async fn download_url_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/42/download-url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "download_url": "https://blob.example.com/docs/a.xlsx?sig=abc",
            "filename": "a.xlsx",
            "expires_in_hours": 1
        })))
        .mount(&server)
        .await;

    let url = gateway(&server, &MemoryCredentials::new())
        .download_url(42)
        .await
        .expect("url ok");
    assert_eq!(url.host_str(), Some("blob.example.com"));
}

#[tokio::test]
async fn download_url_errors_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/7/download-url"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "File is processing."})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/documents/8/download-url"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "missing"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/documents/9/download-url"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "SAS generation failed"})),
        )
        .mount(&server)
        .await;

    let gateway = gateway(&server, &MemoryCredentials::new());

    let err = gateway.download_url(7).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.detail.as_deref(), Some("File is processing."));
    assert_eq!(preview_failure(&err).kind, PreviewFailureKind::NotReady);

    let err = gateway.download_url(8).await.unwrap_err();
    assert_eq!(preview_failure(&err).kind, PreviewFailureKind::NotFound);

    let err = gateway.download_url(9).await.unwrap_err();
    let failure = preview_failure(&err);
    assert_eq!(failure.kind, PreviewFailureKind::Unknown);
    assert_eq!(failure.detail.as_deref(), Some("SAS generation failed"));
}

#[tokio::test]
async fn unauthorized_response_discards_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/facets"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate"})),
        )
        .mount(&server)
        .await;

    let creds = MemoryCredentials::with_token("expired");
    let err = gateway(&server, &creds).facets().await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Unauthorized);
    assert_eq!(creds.bearer(), None);
}

#[tokio::test]
async fn login_stores_returned_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=tanaka"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "jwt-token", "token_type": "bearer"})),
        )
        .mount(&server)
        .await;

    let creds = MemoryCredentials::new();
    gateway(&server, &creds)
        .login("tanaka", "p@ss word")
        .await
        .expect("login ok");
    assert_eq!(creds.bearer().as_deref(), Some("jwt-token"));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/facets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        base_url: format!("{}/api", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    };
    let gateway = HttpGateway::new(settings, Arc::new(MemoryCredentials::new())).unwrap();
    let err = gateway.facets().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/facets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let settings = ClientSettings {
        base_url: format!("{}/api", server.uri()),
        max_bytes: 16,
        ..ClientSettings::default()
    };
    let gateway = HttpGateway::new(settings, Arc::new(MemoryCredentials::new())).unwrap();
    let err = gateway.facets().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::TooLarge { max_bytes: 16 });
}

#[test]
fn invalid_base_url_is_rejected() {
    let settings = ClientSettings {
        base_url: "not a url".into(),
        ..ClientSettings::default()
    };
    let err = HttpGateway::new(settings, Arc::new(MemoryCredentials::new()))
        .err()
        .expect("invalid url");
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
