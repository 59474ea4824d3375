use futures::StreamExt;
use reqwest::header::AUTHORIZATION;
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;
use super::types::{
    Article, AuthResponse, CategoriesUpdate, Category, FeedUrlRequest, LoginRequest, Preferences,
    SignupRequest, SummarizeRequest, SummarizeResponse,
};
use crate::config::Config;
use crate::session::{CredentialHandle, SessionStore};

/// Maximum accepted response body (5 MiB).
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Follow at most 3 redirects and bail out on loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Single point of contact with the backend.
///
/// Cheap to clone: background tasks take their own copy. The credential is
/// read from the shared handle right before each dispatch, so a request
/// started after logout goes out without a bearer header.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base: Arc<str>,
    credential: CredentialHandle,
    summary_timeout: Duration,
}

impl Gateway {
    pub fn new(config: &Config, credential: CredentialHandle) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base: Arc::from(config.api_root()),
            credential,
            summary_timeout: config.summary_timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn url_with_query(&self, path: &str, key: &str, value: &str) -> Result<url::Url, ApiError> {
        url::Url::parse_with_params(&self.url(path), &[(key, value)])
            .map_err(|e| ApiError::Unknown(format!("invalid request URL: {e}")))
    }

    // ------------------------------------------------------------------------
    // Endpoints
    // ------------------------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = LoginRequest { email, password };
        let resp: AuthResponse = self
            .send_json(self.client.post(self.url("/auth/login")).json(&body))
            .await?;
        Ok(resp.token)
    }

    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<String, ApiError> {
        let body = SignupRequest {
            email,
            password,
            name,
        };
        let resp: AuthResponse = self
            .send_json(self.client.post(self.url("/auth/signup")).json(&body))
            .await?;
        Ok(resp.token)
    }

    pub async fn fetch_preferences(&self) -> Result<Preferences, ApiError> {
        self.send_json(self.client.get(self.url("/preferences"))).await
    }

    pub async fn update_categories(&self, categories: &BTreeSet<Category>) -> Result<(), ApiError> {
        let body = CategoriesUpdate {
            categories: categories.iter().map(|c| c.id()).collect(),
        };
        self.send(self.client.put(self.url("/preferences")).json(&body))
            .await
            .map(drop)
    }

    pub async fn fetch_news(&self) -> Result<Vec<Article>, ApiError> {
        self.send_json(self.client.get(self.url("/news"))).await
    }

    pub async fn search_news(&self, query: &str) -> Result<Vec<Article>, ApiError> {
        let url = self.url_with_query("/news/search", "query", query)?;
        self.send_json(self.client.get(url)).await
    }

    /// Summarization runs an LLM server-side and gets the longer timeout.
    pub async fn summarize(&self, article_url: &str) -> Result<String, ApiError> {
        let body = SummarizeRequest { article_url };
        let resp: SummarizeResponse = self
            .send_json(
                self.client
                    .post(self.url("/news/summarize"))
                    .timeout(self.summary_timeout)
                    .json(&body),
            )
            .await?;
        Ok(resp.summary)
    }

    pub async fn add_feed(&self, feed_url: &str) -> Result<(), ApiError> {
        let body = FeedUrlRequest { feed_url };
        self.send(self.client.post(self.url("/rss-feeds")).json(&body))
            .await
            .map(drop)
    }

    /// The feed is identified by its exact URL, sent as a query parameter.
    pub async fn remove_feed(&self, feed_url: &str) -> Result<(), ApiError> {
        let url = self.url_with_query("/rss-feeds", "feed_url", feed_url)?;
        self.send(self.client.delete(url)).await.map(drop)
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "Undecodable response body");
            ApiError::Unknown(format!("invalid response body: {e}"))
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let request = match SessionStore::bearer(&self.credential) {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request failed");
            ApiError::from_transport(&e)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();

        if !status.is_success() {
            // An unreadable error body still classifies by status alone
            let body = read_limited_bytes(response, MAX_BODY_SIZE)
                .await
                .unwrap_or_default();
            let err = ApiError::from_status(status.as_u16(), &body);
            tracing::warn!(path = %url, status = status.as_u16(), error = %err, "Backend returned error");
            return Err(err);
        }

        tracing::debug!(path = %url, status = status.as_u16(), "Request succeeded");
        read_limited_bytes(response, MAX_BODY_SIZE).await
    }
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::Unknown(format!("response too large (max {limit} bytes)")));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiError::from_transport(&e))?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::Unknown(format!("response too large (max {limit} bytes)")));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer, credential: CredentialHandle) -> Gateway {
        let config = Config {
            api_url: format!("{}/api", server.uri()),
            ..Config::default()
        };
        Gateway::new(&config, credential).unwrap()
    }

    async fn authed_gateway(server: &MockServer, token: &str) -> Gateway {
        let db = crate::storage::Database::open(":memory:").await.unwrap();
        let mut session = SessionStore::new(db);
        session.establish(token.to_string()).await.unwrap();
        gateway_for(server, session.credential())
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "a@b.c", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": "t-1", "user": {"id": 1}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, CredentialHandle::default());
        assert_eq!(gateway.login("a@b.c", "pw").await.unwrap(), "t-1");
    }

    #[tokio::test]
    async fn test_no_bearer_without_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t-2"})))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, CredentialHandle::default());
        gateway.signup("a@b.c", "pw", "Ada").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_bearer_attached_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/preferences"))
            .and(header("Authorization", "Bearer secret-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "categories": ["Tech"],
                "custom_rss_feeds": ["https://blog.example.com/rss"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "secret-1").await;
        let prefs = gateway.fetch_preferences().await.unwrap();
        assert_eq!(
            prefs,
            Preferences {
                categories: vec!["Tech".to_string()],
                custom_rss_feeds: vec!["https://blog.example.com/rss".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_401_maps_to_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})),
            )
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "expired").await;
        let err = gateway.fetch_news().await.unwrap_err();
        assert!(err.is_authorization());
    }

    #[tokio::test]
    async fn test_backend_detail_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Incorrect email or password"})),
            )
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, CredentialHandle::default());
        let err = gateway.login("a@b.c", "bad").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Backend {
                status: 400,
                detail: "Incorrect email or password".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_search_encodes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news/search"))
            .and(query_param("query", "rust & tokio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"title": "Async Rust", "link": "https://news.example.com/1", "snippet": "s", "source": "Example"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "t").await;
        let articles = gateway.search_news("rust & tokio").await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Async Rust");
    }

    #[tokio::test]
    async fn test_update_categories_sends_ids() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/preferences"))
            .and(body_json(json!({"categories": ["Tech", "Science"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "t").await;
        let set: BTreeSet<Category> = [Category::Science, Category::Tech].into_iter().collect();
        gateway.update_categories(&set).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_feed_uses_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/rss-feeds"))
            .and(query_param("feed_url", "https://blog.example.com/rss?x=1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "t").await;
        gateway
            .remove_feed("https://blog.example.com/rss?x=1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_feed_posts_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/rss-feeds"))
            .and(body_json(json!({"feed_url": "https://blog.example.com/rss"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "t").await;
        gateway.add_feed("https://blog.example.com/rss").await.unwrap();
    }

    #[tokio::test]
    async fn test_summarize_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/news/summarize"))
            .and(body_json(json!({"article_url": "https://news.example.com/1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "Short."})))
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "t").await;
        assert_eq!(
            gateway.summarize("https://news.example.com/1").await.unwrap(),
            "Short."
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "t").await;
        assert!(matches!(gateway.fetch_news().await, Err(ApiError::Unknown(_))));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b' '; MAX_BODY_SIZE + 1]))
            .mount(&server)
            .await;

        let gateway = authed_gateway(&server, "t").await;
        let err = gateway.fetch_news().await.unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network() {
        let config = Config {
            api_url: "http://127.0.0.1:9/api".to_string(),
            ..Config::default()
        };
        let gateway = Gateway::new(&config, CredentialHandle::default()).unwrap();
        assert!(matches!(gateway.fetch_news().await, Err(ApiError::Network(_))));
    }
}
