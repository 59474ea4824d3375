//! Shared harness: an `App` wired to a wiremock backend and an in-memory
//! credential store, plus helpers to pump background events.
#![allow(dead_code)]

use newsdigest::app::{App, AppEvent};
use newsdigest::config::Config;
use newsdigest::controller::{handle_app_event, OnboardingPhase};
use newsdigest::session::CREDENTIAL_KEY;
use newsdigest::storage::Database;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

pub struct Harness {
    pub server: MockServer,
    pub db: Database,
    pub app: App,
    pub tx: mpsc::Sender<AppEvent>,
    pub rx: mpsc::Receiver<AppEvent>,
}

impl Harness {
    /// Fresh install: no stored credential.
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// A credential left behind by a previous run.
    pub async fn with_stored_token(token: &str) -> Self {
        Self::build(Some(token)).await
    }

    async fn build(token: Option<&str>) -> Self {
        let server = MockServer::start().await;
        let db = Database::open(":memory:").await.unwrap();
        if let Some(token) = token {
            db.set_state(CREDENTIAL_KEY, token).await.unwrap();
        }
        let config = Config {
            api_url: format!("{}/api", server.uri()),
            ..Config::default()
        };
        let app = App::new(config, db.clone()).unwrap();
        let (tx, rx) = mpsc::channel(64);
        Self {
            server,
            db,
            app,
            tx,
            rx,
        }
    }

    /// Stored credential accepted, preferences with `categories`, and the
    /// default feed holding `titles`. Returns once both loads have landed.
    pub async fn ready(categories: &[&str], titles: &[&str]) -> Self {
        let mut h = Self::with_stored_token(TOKEN).await;
        mount_preferences(&h.server, categories, &[]).await;
        mount_news(&h.server, titles).await;

        let tx = h.tx.clone();
        h.app.start(&tx).await;
        h.pump_until("ready with feed", |app| {
            app.phase() == OnboardingPhase::Ready
                && !app.feed.is_loading()
                && app.preferences.current().is_some()
                && !app.preferences.is_loading()
        })
        .await;
        h
    }

    /// Apply background events until `cond` holds. Panics after 5 seconds.
    pub async fn pump_until<F>(&mut self, what: &str, cond: F)
    where
        F: Fn(&App) -> bool,
    {
        let result = tokio::time::timeout(Duration::from_secs(5), async {
            while !cond(&self.app) {
                let Some(event) = self.rx.recv().await else {
                    break;
                };
                handle_app_event(&mut self.app, event, &self.tx).await;
            }
        })
        .await;
        assert!(result.is_ok(), "timed out waiting for {what}");
    }

    /// Apply every event that arrives within `window`.
    pub async fn settle(&mut self, window: Duration) {
        while let Ok(Some(event)) = tokio::time::timeout(window, self.rx.recv()).await {
            handle_app_event(&mut self.app, event, &self.tx).await;
        }
    }

    /// Requests the backend received for `verb` on `route`.
    pub async fn requests_to(&self, verb: &str, route: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == route)
            .count()
    }
}

pub fn article(title: &str) -> Value {
    json!({
        "title": title,
        "link": format!("https://news.example.com/{}", title.to_lowercase().replace(' ', "-")),
        "snippet": format!("About {title}"),
        "source": "Example Wire",
        "category": "Tech",
        "image": null,
        "published": "Sun, 10 Mar 2024 09:00:00 +0000"
    })
}

pub fn articles(titles: &[&str]) -> Value {
    Value::Array(titles.iter().map(|t| article(t)).collect())
}

pub fn preferences(categories: &[&str], feeds: &[&str]) -> Value {
    json!({"categories": categories, "custom_rss_feeds": feeds})
}

pub async fn mount_preferences(server: &MockServer, categories: &[&str], feeds: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(preferences(categories, feeds)))
        .mount(server)
        .await;
}

pub async fn mount_news(server: &MockServer, titles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles(titles)))
        .mount(server)
        .await;
}

pub fn titles(app: &App) -> Vec<String> {
    app.feed.articles().iter().map(|a| a.title.clone()).collect()
}
