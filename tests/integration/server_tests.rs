//! HTTP service behavior, driven through the router without a socket

use crate::common::{coordinator, mount_page, mount_provider, organic, page, test_config, API_KEY};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use serp_scout::config::Config;
use serp_scout::crawler::{build_http_client, Coordinator, HttpFetcher};
use serp_scout::provider::{Credential, SerpClient};
use serp_scout::server::{router, AppState};
use serp_scout::{Blacklist, BlacklistCache};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(config: Config) -> Router {
    router(AppState::new(coordinator(config, &[])))
}

/// Router whose provider credential comes from an unset variable
fn app_without_credential() -> Router {
    let config = Config::default();
    let client = build_http_client().unwrap();
    let provider = SerpClient::new(client.clone(), config.provider.clone())
        .with_credential(Credential::Env("SERP_SCOUT_IT_UNSET_KEY".to_string()));
    let coordinator = Coordinator::new(
        Arc::new(config),
        provider,
        Arc::new(HttpFetcher::new(client, Duration::ZERO)),
        Arc::new(BlacklistCache::preloaded(Blacklist::empty())),
    );
    router(AppState::new(coordinator))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_run_search_missing_fields_is_400() {
    let response = app(Config::default())
        .oneshot(post_json("/api/run-search", json!({ "q": "plumbers" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "missing q or location");
}

#[tokio::test]
async fn test_run_search_invalid_json_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/run-search")
        .body(Body::from("{oops"))
        .unwrap();
    let response = app(Config::default()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid JSON");
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let response = app(Config::default())
        .oneshot(get("/api/run-search"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["error"], "POST only");

    let response = app(Config::default())
        .oneshot(post_json("/api/proxy-locations", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["error"], "GET only");
}

#[tokio::test]
async fn test_missing_credential_is_500() {
    let response = app_without_credential()
        .oneshot(post_json(
            "/api/run-search",
            json!({ "q": "plumbers", "location": "Bend, OR" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "SERP_SCOUT_IT_UNSET_KEY not set");

    let response = app_without_credential()
        .oneshot(get("/api/run-search-sse?q=plumbers&location=Bend"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_provider_failure_is_502() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&provider)
        .await;

    let response = app(test_config(&provider.uri()))
        .oneshot(post_json(
            "/api/run-search",
            json!({ "q": "plumbers", "location": "Bend, OR" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Search provider fetch failed");
    assert_eq!(body["detail"], "HTTP 503");
}

#[tokio::test]
async fn test_run_search_success() {
    let provider = MockServer::start().await;
    let sites = MockServer::start().await;
    mount_page(&sites, "/", page("Bend Plumbing", "d", "h")).await;
    mount_provider(&provider, "plumbers", organic(&[format!("{}/", sites.uri())])).await;

    let response = app(test_config(&provider.uri()))
        .oneshot(post_json(
            "/api/run-search",
            json!({ "q": "plumbers", "location": "Bend, OR" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["results"][0]["title"], "Bend Plumbing");
    assert_eq!(body["results"][0]["rank"], 1);
    assert_eq!(body["stats"]["successful"], 1);
    assert!(body["logs"]["serpRaw"]["organic_results"].is_array());
}

#[tokio::test]
async fn test_sse_streams_results_then_done() {
    let provider = MockServer::start().await;
    let sites = MockServer::start().await;
    mount_page(&sites, "/one", page("One", "d", "h")).await;
    mount_page(&sites, "/two", page("Two", "d", "h")).await;
    let links = vec![format!("{}/one", sites.uri()), format!("{}/two", sites.uri())];
    mount_provider(&provider, "plumbers", organic(&links)).await;

    let response = app(test_config(&provider.uri()))
        .oneshot(get("/api/run-search-sse?q=plumbers&location=Bend%2C%20OR"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

    let text = body_text(response).await;
    assert_eq!(text.matches("event: result").count(), 2);
    assert_eq!(text.matches("event: done").count(), 1);
    assert!(text.find("event: done").unwrap() > text.rfind("event: result").unwrap());
    assert!(text.contains("\"successful\":2"));
}

#[tokio::test]
async fn test_sse_provider_failure_is_error_event() {
    let provider = MockServer::start().await;
    mount_provider(&provider, "plumbers", json!({ "error": "Quota exceeded" })).await;

    let response = app(test_config(&provider.uri()))
        .oneshot(get("/api/run-search-sse?q=plumbers&location=Bend"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("event: error"));
    assert!(text.contains("Quota exceeded"));
    assert!(!text.contains("event: done"));
}

#[tokio::test]
async fn test_sse_missing_location_is_400() {
    let response = app(Config::default())
        .oneshot(get("/api/run-search-sse?q=plumbers"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_retry_scrape_success() {
    let sites = MockServer::start().await;
    mount_page(&sites, "/", page("Retried Page", "d", "h")).await;

    let response = app(Config::default())
        .oneshot(post_json(
            "/api/retry-scrape",
            json!({ "url": format!("{}/", sites.uri()) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"]["title"], "Retried Page");
    assert_eq!(body["result"]["rank"], Value::Null);
    assert_eq!(body["result"]["brand"], "127.0.0.1");
}

#[tokio::test]
async fn test_retry_scrape_failure_is_still_200() {
    let response = app(Config::default())
        .oneshot(post_json(
            "/api/retry-scrape",
            json!({ "url": "http://127.0.0.1:9/unreachable" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"]["finalUrl"], "http://127.0.0.1:9/unreachable");
    assert_eq!(body["result"]["errorKind"], "transport");
    assert!(body["result"]["error"].is_string());
}

#[tokio::test]
async fn test_retry_scrape_missing_url_is_400() {
    let response = app(Config::default())
        .oneshot(post_json("/api/retry-scrape", json!({ "url": 42 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proxy_locations_passthrough() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations.json"))
        .and(query_param("q", "Ben"))
        .and(query_param("limit", "10"))
        .and(query_param("api_key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "canonical_name": "Bend,Oregon,United States" }])),
        )
        .mount(&provider)
        .await;

    let response = app(test_config(&provider.uri()))
        .oneshot(get("/api/proxy-locations?q=Ben"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await[0]["canonical_name"],
        "Bend,Oregon,United States"
    );
}

#[tokio::test]
async fn test_proxy_locations_upstream_status_verbatim() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations.json"))
        .respond_with(ResponseTemplate::new(429).set_body_string(r#"{"error":"slow down"}"#))
        .mount(&provider)
        .await;

    let response = app(test_config(&provider.uri()))
        .oneshot(get("/api/proxy-locations?q=Ben"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["error"], "slow down");
}

#[tokio::test]
async fn test_proxy_locations_missing_q_is_400() {
    let response = app(Config::default())
        .oneshot(get("/api/proxy-locations"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "missing q parameter");
}

#[tokio::test]
async fn test_cors_headers() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/run-search")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app(Config::default()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));

    let request = Request::builder()
        .method("POST")
        .uri("/api/run-search")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::from("{}"))
        .unwrap();
    let response = app(Config::default()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_bare_options_without_cors_is_204() {
    let mut config = Config::default();
    config.server.cors_allow_any_origin = false;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/retry-scrape")
        .body(Body::empty())
        .unwrap();
    let response = app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
