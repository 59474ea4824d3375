//! Integration tests for the default feed, search, and last-initiated-wins.

mod common;

use common::{articles, mount_news, titles, Harness};
use newsdigest::api::ApiError;
use newsdigest::controller::{FeedMode, OnboardingPhase};
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_search(h: &Harness, query: &str, titles: &[&str], delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/api/news/search"))
        .and(query_param("query", query))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(articles(titles))
                .set_delay(delay),
        )
        .mount(&h.server)
        .await;
}

#[tokio::test]
async fn test_default_feed_loaded_on_ready() {
    let h = Harness::ready(&["Tech"], &["One", "Two", "Three"]).await;

    assert_eq!(titles(&h.app), vec!["One", "Two", "Three"]);
    assert_eq!(h.app.feed.mode(), &FeedMode::Default);
    assert_eq!(h.app.feed.error(), None);
    assert_eq!(h.requests_to("GET", "/api/news").await, 1);
}

#[tokio::test]
async fn test_later_search_wins_over_slower_earlier_one() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    mount_search(&h, "rust", &["Slow rust result"], Duration::from_millis(400)).await;
    mount_search(&h, "go", &["Fast go result"], Duration::ZERO).await;

    h.app.search("rust", &tx).unwrap();
    h.app.search("go", &tx).unwrap();

    h.pump_until("fast search", |app| {
        app.feed.mode() == &FeedMode::Search("go".into())
    })
    .await;
    // Let the slow response land too
    h.settle(Duration::from_millis(700)).await;

    assert_eq!(titles(&h.app), vec!["Fast go result"]);
    assert_eq!(h.app.feed.mode(), &FeedMode::Search("go".into()));
    assert!(!h.app.feed.is_searching());
}

#[tokio::test]
async fn test_search_supersedes_inflight_default_load() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    h.server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(articles(&["Refreshed default"]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&h.server)
        .await;
    mount_search(&h, "climate", &["Climate report"], Duration::ZERO).await;

    h.app.load_default_feed(&tx);
    h.app.search("climate", &tx).unwrap();
    h.settle(Duration::from_millis(700)).await;

    assert_eq!(titles(&h.app), vec!["Climate report"]);
}

#[tokio::test]
async fn test_query_is_trimmed_and_encoded() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    mount_search(&h, "AI & chips", &["Match"], Duration::ZERO).await;

    h.app.search("  AI & chips  ", &tx).unwrap();
    h.pump_until("search result", |app| !app.feed.is_searching()).await;

    assert_eq!(titles(&h.app), vec!["Match"]);
}

#[tokio::test]
async fn test_blank_search_is_noop() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    assert!(h.app.search("   ", &tx).is_ok());

    assert!(!h.app.feed.is_searching());
    assert_eq!(h.app.feed.mode(), &FeedMode::Default);
    assert_eq!(h.requests_to("GET", "/api/news/search").await, 0);
}

#[tokio::test]
async fn test_overlong_search_rejected() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    let query = "x".repeat(257);
    let err = h.app.search(&query, &tx).unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(h.app.status_message.is_some());
    assert_eq!(titles(&h.app), vec!["Default"]);
    assert_eq!(h.requests_to("GET", "/api/news/search").await, 0);
}

#[tokio::test]
async fn test_failed_search_keeps_previous_articles() {
    let mut h = Harness::ready(&["Tech"], &["Default one", "Default two"]).await;
    let tx = h.tx.clone();

    Mock::given(method("GET"))
        .and(path("/api/news/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    h.app.search("outage", &tx).unwrap();
    h.pump_until("search failure", |app| !app.feed.is_searching()).await;

    assert_eq!(titles(&h.app), vec!["Default one", "Default two"]);
    assert_eq!(h.app.feed.error(), Some("Search failed"));
    let (status, _) = h.app.status_message.as_ref().unwrap();
    assert_eq!(status.as_ref(), "Search failed");
    assert_eq!(h.app.phase(), OnboardingPhase::Ready);
}

#[tokio::test]
async fn test_failed_default_load_reports_error() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    h.server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&h.server)
        .await;

    h.app.load_default_feed(&tx);
    h.pump_until("load failure", |app| !app.feed.is_loading()).await;

    assert_eq!(titles(&h.app), vec!["Default"]);
    assert_eq!(h.app.feed.error(), Some("Could not load news"));
}

#[tokio::test]
async fn test_clear_search_reloads_default_feed() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    mount_search(&h, "space", &["Rocket launch"], Duration::ZERO).await;
    h.app.search_input = "space".into();
    h.app.search("space", &tx).unwrap();
    h.pump_until("search result", |app| !app.feed.is_searching()).await;
    assert_eq!(titles(&h.app), vec!["Rocket launch"]);

    h.app.clear_search(&tx);
    assert!(h.app.search_input.is_empty());
    assert!(!h.app.is_searching());

    h.pump_until("default reload", |app| !app.feed.is_loading()).await;
    assert_eq!(titles(&h.app), vec!["Default"]);
    assert_eq!(h.requests_to("GET", "/api/news").await, 2);
}

#[tokio::test]
async fn test_failed_reload_after_clear_keeps_search_results_labelled() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    mount_search(&h, "space", &["Rocket launch"], Duration::ZERO).await;
    h.app.search("space", &tx).unwrap();
    h.pump_until("search result", |app| !app.feed.is_searching()).await;

    h.server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    h.app.clear_search(&tx);
    assert!(!h.app.is_searching());
    assert_eq!(h.app.feed.mode(), &FeedMode::Search("space".into()));

    h.pump_until("reload failure", |app| !app.feed.is_loading()).await;
    assert_eq!(titles(&h.app), vec!["Rocket launch"]);
    assert_eq!(h.app.feed.mode(), &FeedMode::Search("space".into()));
    assert_eq!(h.app.feed.error(), Some("Could not load news"));
    assert!(!h.app.is_searching());
}

#[tokio::test]
async fn test_unauthorized_feed_resets_session() {
    let mut h = Harness::ready(&["Tech"], &["Default"]).await;
    let tx = h.tx.clone();

    h.server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    h.app.load_default_feed(&tx);
    h.pump_until("reset", |app| app.phase() == OnboardingPhase::NeedsAuth)
        .await;

    assert!(h.app.feed.articles().is_empty());
    assert!(!h.app.session.is_authenticated());
}

#[tokio::test]
async fn test_selection_clamped_to_new_results() {
    let mut h = Harness::ready(&["Tech"], &["A", "B", "C"]).await;
    let tx = h.tx.clone();

    h.app.nav_down();
    h.app.nav_down();
    assert_eq!(h.app.selected().unwrap().title, "C");

    mount_search(&h, "one", &["Only"], Duration::ZERO).await;
    h.app.search("one", &tx).unwrap();
    h.pump_until("search result", |app| !app.feed.is_searching()).await;

    assert_eq!(h.app.selected().unwrap().title, "Only");
}

#[tokio::test]
async fn test_reload_replaces_articles() {
    let mut h = Harness::ready(&["Tech"], &["Old"]).await;
    let tx = h.tx.clone();

    h.server.reset().await;
    mount_news(&h.server, &["New A", "New B"]).await;

    h.app.load_default_feed(&tx);
    h.pump_until("reload", |app| !app.feed.is_loading()).await;

    assert_eq!(titles(&h.app), vec!["New A", "New B"]);
}
