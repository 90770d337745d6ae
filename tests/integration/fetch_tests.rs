//! Fetcher behavior against mock sites

use crate::common::{mount_page, mount_slow_page, page};
use serp_scout::config::TimeoutTier;
use serp_scout::crawler::{build_http_client, HttpFetcher, IdentityProfile, SEARCH_ENGINE_REFERER};
use serp_scout::state::{BlockReason, FetchError, FetchOutcome, FetchPhase};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIER: TimeoutTier = TimeoutTier::new(2_000, 2_000);

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(build_http_client().unwrap(), Duration::from_millis(10))
}

#[tokio::test]
async fn test_fetch_success_extracts_signals() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page("Bend Plumbing &amp; Drain", "Fast, friendly plumbers.", "Your <em>local</em> plumber"),
    )
    .await;

    let url = format!("{}/", server.uri());
    let outcome = fetcher().fetch_page(&url, TIER).await;

    match outcome {
        FetchOutcome::Success {
            final_url, page, ..
        } => {
            assert_eq!(final_url, url);
            assert_eq!(page.title_raw.as_deref(), Some("Bend Plumbing & Drain"));
            assert_eq!(
                page.meta_description_raw.as_deref(),
                Some("Fast, friendly plumbers.")
            );
            assert_eq!(page.h1_raw.as_deref(), Some("Your local plumber"));
            assert!(page.word_count > 10);
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_first_attempt_uses_primary_identity() {
    let server = MockServer::start().await;
    let primary = IdentityProfile::chrome_windows();
    let platform = primary.headers()["sec-ch-ua-platform"].to_str().unwrap().to_string();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("sec-ch-ua-platform", platform.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("Hi", "d", "h")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = fetcher().fetch_page(&format!("{}/", server.uri()), TIER).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_incapsula_403_twice_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string("<html><body>Request unsuccessful. Incapsula incident ID: 42</body></html>"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let outcome = fetcher().fetch_page(&format!("{}/", server.uri()), TIER).await;

    match outcome {
        FetchOutcome::Blocked { reason, .. } => assert_eq!(reason, BlockReason::Status(403)),
        other => panic!("expected blocked, got {:?}", other),
    }
}

#[tokio::test]
async fn test_block_then_retry_with_referer_succeeds() {
    let server = MockServer::start().await;

    // Only the retry identity carries the search-engine referrer
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("referer", SEARCH_ENGINE_REFERER))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("Real Page", "d", "h")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<title>Not Acceptable!</title>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = fetcher().fetch_page(&format!("{}/", server.uri()), TIER).await;

    match outcome {
        FetchOutcome::Success { page, .. } => {
            assert_eq!(page.title_raw.as_deref(), Some("Real Page"))
        }
        other => panic!("expected success after retry, got {:?}", other),
    }
}

#[tokio::test]
async fn test_signature_in_200_body_is_blocked() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "<html><title>Just a moment</title><p>Please enable cookies.</p></html>".to_string(),
    )
    .await;

    let outcome = fetcher().fetch_page(&format!("{}/", server.uri()), TIER).await;
    match outcome {
        FetchOutcome::Blocked { reason, .. } => assert_eq!(
            reason,
            BlockReason::Signature("Please enable cookies".to_string())
        ),
        other => panic!("expected blocked, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_is_fetch_timeout() {
    let server = MockServer::start().await;
    mount_slow_page(&server, "/", Duration::from_millis(800)).await;

    let tier = TimeoutTier::new(100, 100);
    let outcome = fetcher().fetch_page(&format!("{}/", server.uri()), tier).await;

    match outcome {
        FetchOutcome::Failed { error, .. } => assert_eq!(
            error,
            FetchError::Timeout {
                phase: FetchPhase::Fetch,
                after_ms: 100
            }
        ),
        other => panic!("expected timeout, got {:?}", other),
    }
}

/// Serves response headers promising a long body, then stalls
async fn stalled_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let head = "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 10000\r\n\r\n<html><head><title>Partial";
                let _ = socket.write_all(head.as_bytes()).await;
                tokio::time::sleep(Duration::from_secs(5)).await;
            });
        }
    });

    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_stalled_body_is_body_read_timeout() {
    let url = stalled_body_server().await;

    let tier = TimeoutTier::new(2_000, 200);
    let outcome = fetcher().fetch_page(&url, tier).await;

    match outcome {
        FetchOutcome::Failed { error, .. } => assert_eq!(
            error,
            FetchError::Timeout {
                phase: FetchPhase::BodyRead,
                after_ms: 200
            }
        ),
        other => panic!("expected body read timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let server = MockServer::start().await;
    let target = format!("{}/new", server.uri());
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", target.as_str()))
        .mount(&server)
        .await;
    mount_page(&server, "/new", page("Moved", "d", "h")).await;

    let outcome = fetcher().fetch_page(&format!("{}/old", server.uri()), TIER).await;
    assert!(outcome.is_success());
    assert_eq!(outcome.final_url(), format!("{}/new", server.uri()));
}

#[tokio::test]
async fn test_not_found_page_still_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(page("Page not found", "", "Oops")))
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch_page(&format!("{}/missing", server.uri()), TIER)
        .await;
    match outcome {
        FetchOutcome::Success { page, .. } => {
            assert_eq!(page.title_raw.as_deref(), Some("Page not found"))
        }
        other => panic!("expected success, got {:?}", other),
    }
}
