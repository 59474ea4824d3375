//! Article feed: the default feed and search share one display slot.
//!
//! Every load or search takes a fresh generation; only the result of the most
//! recently initiated request may replace the displayed set.
use crate::api::{ApiError, Article};
use crate::app::{App, AppEvent};
use crate::session::EndReason;
use crate::util::{non_blank, MAX_SEARCH_QUERY_LENGTH};
use tokio::sync::mpsc;

use super::spawn_event;

const LOAD_FAILED_MESSAGE: &str = "Could not load news";
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedMode {
    #[default]
    Default,
    Search(String),
}

#[derive(Debug, Clone, Default)]
pub struct FeedState {
    articles: Vec<Article>,
    /// Mode of `articles`; changes only when a result is applied.
    mode: FeedMode,
    /// Mode of the most recently initiated request.
    requested: FeedMode,
    /// Initial/default load in flight.
    loading: bool,
    /// Search in flight.
    searching: bool,
    /// Soft error from the latest request; the previous set stays visible.
    error: Option<&'static str>,
    generation: u64,
}

/// Outcome of applying a result to the display slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FeedOutcome {
    Stale,
    Replaced,
    Failed(ApiError),
}

impl FeedState {
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn mode(&self) -> &FeedMode {
        &self.mode
    }

    pub fn requested(&self) -> &FeedMode {
        &self.requested
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn begin_load(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.requested = FeedMode::Default;
        self.loading = true;
        self.searching = false;
        self.generation
    }

    pub(crate) fn begin_search(&mut self, query: &str) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.requested = FeedMode::Search(query.to_string());
        self.searching = true;
        self.loading = false;
        self.generation
    }

    pub(crate) fn apply(
        &mut self,
        generation: u64,
        mode: FeedMode,
        result: Result<Vec<Article>, ApiError>,
    ) -> FeedOutcome {
        if generation != self.generation {
            return FeedOutcome::Stale;
        }
        self.loading = false;
        self.searching = false;

        match result {
            Ok(articles) => {
                self.articles = articles;
                self.mode = mode;
                self.error = None;
                FeedOutcome::Replaced
            }
            Err(e) => {
                self.error = Some(match mode {
                    FeedMode::Default => LOAD_FAILED_MESSAGE,
                    FeedMode::Search(_) => SEARCH_FAILED_MESSAGE,
                });
                FeedOutcome::Failed(e)
            }
        }
    }
}

impl App {
    pub fn load_default_feed(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        let generation = self.feed.begin_load();
        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::debug!(generation, "Loading default feed");

        spawn_event("feed_load", event_tx, async move {
            AppEvent::FeedLoaded {
                epoch,
                generation,
                mode: FeedMode::Default,
                result: gateway.fetch_news().await,
            }
        });
    }

    /// Search the backend. Blank queries are ignored; overlong ones are
    /// rejected before dispatch.
    pub fn search(&mut self, query: &str, event_tx: &mpsc::Sender<AppEvent>) -> Result<(), ApiError> {
        let Some(query) = non_blank(query) else {
            return Ok(());
        };
        if query.chars().count() > MAX_SEARCH_QUERY_LENGTH {
            let err = ApiError::Validation(format!(
                "Search query too long (max {} characters)",
                MAX_SEARCH_QUERY_LENGTH
            ));
            self.set_status(err.to_string());
            return Err(err);
        }

        let query = query.to_string();
        let generation = self.feed.begin_search(&query);
        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::debug!(query = %query, generation, "Spawning search");

        spawn_event("search", event_tx, async move {
            let result = gateway.search_news(&query).await;
            AppEvent::FeedLoaded {
                epoch,
                generation,
                mode: FeedMode::Search(query),
                result,
            }
        });
        Ok(())
    }

    /// Drop the query and reload the default feed. The search results stay
    /// on screen, labelled as such, until the reload succeeds.
    pub fn clear_search(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        self.search_input.clear();
        self.load_default_feed(event_tx);
    }

    pub(crate) async fn on_feed_loaded(
        &mut self,
        generation: u64,
        mode: FeedMode,
        result: Result<Vec<Article>, ApiError>,
    ) {
        let expected = self.feed.generation();
        match self.feed.apply(generation, mode, result) {
            FeedOutcome::Stale => {
                tracing::debug!(
                    expected,
                    got = generation,
                    "Ignoring stale feed result (generation mismatch)"
                );
            }
            FeedOutcome::Replaced => {
                self.session.confirm();
                self.clamp_selection();
                tracing::debug!(count = self.feed.articles().len(), mode = ?self.feed.mode(), "Feed updated");
            }
            FeedOutcome::Failed(e) if e.is_authorization() => {
                tracing::warn!(error = %e, "Feed request unauthorized");
                self.reset_session(EndReason::Unauthorized).await;
            }
            FeedOutcome::Failed(e) => {
                tracing::warn!(error = %e, "Feed request failed");
                if let Some(msg) = self.feed.error() {
                    self.set_status(msg);
                }
            }
        }
    }
}
