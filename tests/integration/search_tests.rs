//! Batch orchestration against a mock provider and mock sites

use crate::common::{coordinator, mount_page, mount_provider, mount_slow_page, organic, page, test_config};
use serde_json::json;
use serp_scout::output::{BatchCollector, PLACEHOLDER_DESCRIPTION};
use serp_scout::provider::RankedLink;
use serp_scout::state::ErrorKind;
use serp_scout::{ProviderError, ScoutError};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_plumbers_bend_end_to_end() {
    let provider = MockServer::start().await;
    let sites = MockServer::start().await;

    let names = ["Severson Plumbing", "Bend Drain Pros", "High Desert Rooter"];
    let mut links = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let route = format!("/site{}", i + 1);
        mount_page(&sites, &route, page(name, "Plumbing in Bend", name)).await;
        links.push(format!("{}{}", sites.uri(), route));
    }

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "plumbers"))
        .and(query_param("location", "Bend, OR"))
        .and(query_param("engine", "google"))
        .and(query_param("num", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(organic(&links)))
        .expect(1)
        .mount(&provider)
        .await;

    let coordinator = coordinator(test_config(&provider.uri()), &[]);
    let response = coordinator.search_batch("plumbers", "Bend, OR").await.unwrap();

    assert_eq!(response.query, "plumbers");
    assert_eq!(response.location, "Bend, OR");
    assert_eq!(response.results.len(), 3);

    for (i, row) in response.results.iter().enumerate() {
        assert_eq!(row.rank, Some(i as u32 + 1));
        assert_eq!(row.title, names[i]);
        assert!(row.final_url.is_some());
        assert!(!row.is_blacklisted);
        assert!(!row.is_error());
    }

    let stats = response.stats.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.successful, 3);
    assert_eq!(stats.blacklisted, 0);
    assert_eq!(stats.not_attempted, 0);
    assert!(!stats.deadline_exceeded);

    assert_eq!(response.logs.scraped_raw.len(), 3);
    assert_eq!(response.logs.cleaned.len(), 3);
    assert_eq!(response.logs.serp_raw["search_metadata"]["status"], "Success");
}

#[tokio::test]
async fn test_two_of_five_blacklisted_batch() {
    let provider = MockServer::start().await;
    let sites = MockServer::start().await;
    let port = url::Url::parse(&sites.uri()).unwrap().port().unwrap();

    for route in ["/a", "/b", "/c"] {
        mount_page(&sites, route, page("Competitor", "d", "h")).await;
    }

    // "localhost" and "127.0.0.1" reach the same server but differ as hosts
    let links = vec![
        format!("http://127.0.0.1:{}/a", port),
        format!("http://localhost:{}/directory", port),
        format!("http://127.0.0.1:{}/b", port),
        format!("http://www.localhost:{}/listicle", port),
        format!("http://127.0.0.1:{}/c", port),
    ];
    mount_provider(&provider, "plumbers", organic(&links)).await;

    let coordinator = coordinator(test_config(&provider.uri()), &["localhost"]);
    let response = coordinator.search_batch("plumbers", "Bend, OR").await.unwrap();

    let stats = response.stats.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.blacklisted, 2);
    assert_eq!(stats.to_fetch, 3);
    assert_eq!(stats.successful, 3);

    let ranks: Vec<_> = response.results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);

    for rank in [2usize, 4] {
        let row = &response.results[rank - 1];
        assert!(row.is_blacklisted);
        assert_eq!(row.word_count, 0);
        assert_eq!(row.meta_description, PLACEHOLDER_DESCRIPTION);
        assert!(row.title.ends_with("(Directory/Listicle)"));
    }

    // Placeholders never reach the fetch log
    assert_eq!(response.logs.scraped_raw.len(), 3);
}

#[tokio::test]
async fn test_incapsula_site_renders_error_row() {
    let provider = MockServer::start().await;
    let sites = MockServer::start().await;

    mount_page(&sites, "/ok", page("Open Site", "d", "h")).await;
    Mock::given(method("GET"))
        .and(path("/guarded"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Incapsula incident ID"))
        .expect(2)
        .mount(&sites)
        .await;

    let links = vec![format!("{}/guarded", sites.uri()), format!("{}/ok", sites.uri())];
    mount_provider(&provider, "plumbers", organic(&links)).await;

    let coordinator = coordinator(test_config(&provider.uri()), &[]);
    let response = coordinator.search_batch("plumbers", "Bend, OR").await.unwrap();

    let blocked = &response.results[0];
    assert_eq!(blocked.rank, Some(1));
    assert_eq!(blocked.error_kind, Some(ErrorKind::Blocked));
    assert!(blocked.error.as_deref().unwrap().starts_with("Blocked by site"));
    assert_eq!(blocked.title, "");
    assert_eq!(blocked.meta_description, "");

    assert_eq!(response.results[1].title, "Open Site");

    let stats = response.stats.unwrap();
    assert_eq!(stats.blocked, 1);
    assert_eq!(stats.successful, 1);

    let raw = serde_json::to_value(&response.logs.scraped_raw).unwrap();
    let statuses: Vec<_> = raw
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["outcome"]["status"].as_str().unwrap().to_string())
        .collect();
    assert!(statuses.contains(&"blocked".to_string()));
}

#[tokio::test]
async fn test_provider_error_status_is_fatal() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&provider)
        .await;

    let coordinator = coordinator(test_config(&provider.uri()), &[]);
    let err = coordinator
        .search_batch("plumbers", "Bend, OR")
        .await
        .unwrap_err();

    assert!(matches!(err, ScoutError::Provider(ProviderError::Status(500))));
}

#[tokio::test]
async fn test_provider_error_field_is_fatal() {
    let provider = MockServer::start().await;
    mount_provider(&provider, "plumbers", json!({ "error": "Invalid API key." })).await;

    let coordinator = coordinator(test_config(&provider.uri()), &[]);
    let err = coordinator
        .search_batch("plumbers", "Bend, OR")
        .await
        .unwrap_err();

    assert!(matches!(err, ScoutError::Provider(ProviderError::Api(_))));
}

#[tokio::test]
async fn test_deadline_reports_not_attempted() {
    let provider = MockServer::start().await;
    let sites = MockServer::start().await;

    let mut links = Vec::new();
    for i in 0..4 {
        let route = format!("/slow{}", i);
        mount_slow_page(&sites, &route, Duration::from_millis(400)).await;
        links.push(RankedLink {
            link: format!("{}{}", sites.uri(), route),
            source: Some(format!("Slow {}", i)),
        });
    }

    let mut config = test_config(&provider.uri());
    config.scrape.pool_size = 1;
    config.scrape.global_deadline_ms = 300;
    config.scrape.drain_grace_ms = 2_000;

    let coordinator = coordinator(config, &[]);
    let mut collector = BatchCollector::new();
    let summary = coordinator.run(&links, &mut collector).await;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.scraped, 1);
    assert_eq!(summary.successful, 1);
    assert_eq!(summary.not_attempted, 3);
    assert!(summary.deadline_exceeded);

    let response = collector.into_response("slow", "nowhere", serde_json::Value::Null);
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].brand, "Slow 0");
}
