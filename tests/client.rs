// Integration tests for `ApiClient` against a wiremock stand-in for the
// upstream link API.

use axum::http::HeaderValue;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shinkr_dashboard::auth::Credentials;
use shinkr_dashboard::client::{ApiClient, ChartScope};
use shinkr_dashboard::error::Error;
use shinkr_dashboard::models::{CreateLinkRequest, EditLinkRequest};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn creds() -> Credentials {
    Credentials::new(None, Some(HeaderValue::from_static("Bearer session-token")))
}

// ── Links ───────────────────────────────────────────────────────────

#[tokio::test]
async fn links_forward_credentials_and_decode() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/protected/links"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "title": "Docs",
            "original_url": "https://example.com/docs",
            "short_url": "http://localhost:8080/s/docs01",
            "clicks": 9,
            "created_at": "2024-05-01T10:00:00Z",
            "expire_at": "2024-07-01T00:00:00Z",
            "password": true
        }])))
        .mount(&server)
        .await;

    let links = client.links(&creds()).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].short_code(), Some("docs01"));
    assert!(links[0].password);
    assert!(links[0].expire_at.is_some());
}

#[tokio::test]
async fn non_array_payload_is_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/protected/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "links": [] })))
        .mount(&server)
        .await;

    let result = client.links(&creds()).await;
    assert!(
        matches!(result, Err(Error::Malformed { .. })),
        "expected Malformed, got: {result:?}"
    );
}

#[tokio::test]
async fn non_2xx_surfaces_status_and_upstream_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/protected/titles"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "unauthorized" })),
        )
        .mount(&server)
        .await;

    match client.titles(&Credentials::default()).await {
        Err(Error::Status { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_upstream_is_transport_error() {
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:1").unwrap(),
    );
    let result = client.summary(&creds()).await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}

#[tokio::test]
async fn create_posts_the_request_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/protected/shorten"))
        .and(body_json(json!({
            "original_url": "https://example.com/a/very/long/path",
            "title": "Launch",
            "shortcode": "launch"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "short_url": "http://localhost:8080/s/launch" })),
        )
        .mount(&server)
        .await;

    let request = CreateLinkRequest {
        original_url: "https://example.com/a/very/long/path".into(),
        title: "Launch".into(),
        shortcode: Some("launch".into()),
        ..Default::default()
    };
    let created = client.create_link(&request, &creds()).await.unwrap();
    assert_eq!(created.short_url, "http://localhost:8080/s/launch");
}

#[tokio::test]
async fn create_conflict_keeps_upstream_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/protected/shorten"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "Shortcode already taken" })),
        )
        .mount(&server)
        .await;

    let request = CreateLinkRequest {
        original_url: "https://example.com".into(),
        title: "Dup".into(),
        shortcode: Some("taken".into()),
        ..Default::default()
    };
    let result = client.create_link(&request, &creds()).await;
    assert!(matches!(result, Err(Error::Status { status: 409, .. })));
}

#[tokio::test]
async fn edit_tolerates_an_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/protected/edit/abc123"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let request = EditLinkRequest {
        title: "Home".into(),
        original_url: "https://example.com".into(),
        ..Default::default()
    };
    let updated = client.edit_link("abc123", &request, &creds()).await.unwrap();
    assert_eq!(updated, serde_json::Value::Null);
}

#[tokio::test]
async fn delete_uses_short_code_path() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/protected/links/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_link("abc123", &creds()).await.unwrap();
}

// ── Chart rows ──────────────────────────────────────────────────────

#[tokio::test]
async fn account_and_link_scopes_hit_different_endpoints() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/protected/analytics/devices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "device_type": "mobile", "count": 4 }])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/protected/analytics/piechart/abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "device_type": "tablet", "count": 1 }])),
        )
        .mount(&server)
        .await;

    let account = client.device_rows(&ChartScope::Account, &creds()).await.unwrap();
    assert_eq!(account[0].device_type.as_deref(), Some("mobile"));

    let link = client
        .device_rows(&ChartScope::Link("abc123".into()), &creds())
        .await
        .unwrap();
    assert_eq!(link[0].device_type.as_deref(), Some("tablet"));
}

#[tokio::test]
async fn windowed_charts_send_days() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/protected/analytics/worldchart/abc123"))
        .and(query_param("days", "30"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "country": "India", "clicks": 5 }])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/protected/analytics/line"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "date": "2024-06-07", "clicks": 2, "links": 1 }
        ])))
        .mount(&server)
        .await;

    let countries = client
        .country_rows(&ChartScope::Link("abc123".into()), 30, &creds())
        .await
        .unwrap();
    assert_eq!(countries[0].clicks, 5);

    let daily = client.daily_rows(&ChartScope::Account, 7, &creds()).await.unwrap();
    assert_eq!(daily[0].date, "2024-06-07");
}

#[tokio::test]
async fn monthly_row_with_negative_count_is_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/protected/analytics/bar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "month": "2024-01-01", "click_count": -3 }
        ])))
        .mount(&server)
        .await;

    let result = client.monthly_rows(&ChartScope::Account, &creds()).await;
    assert!(matches!(result, Err(Error::Malformed { .. })));
}

#[tokio::test]
async fn short_code_is_percent_encoded_into_one_segment() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/protected/analytics/barchart/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client
        .monthly_rows(&ChartScope::Link("a/b".into()), &creds())
        .await
        .unwrap();
    assert!(rows.is_empty());
}
