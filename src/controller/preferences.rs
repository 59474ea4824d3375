//! User preferences: categories and custom RSS feeds.
//!
//! Every mutation is followed by a full re-fetch of preferences and the feed;
//! the local copy is never patched in place.
use crate::api::{ApiError, Category, Preferences};
use crate::app::{App, AppEvent, Dialog, FeedChange};
use crate::session::EndReason;
use crate::util::non_blank;
use std::collections::BTreeSet;
use tokio::sync::mpsc;

use super::spawn_event;

pub const NO_CATEGORY_MESSAGE: &str = "Please select at least one category";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save preferences. Please try again.";
pub const ADD_FEED_FAILED_MESSAGE: &str = "Failed to add RSS feed";
pub const REMOVE_FEED_FAILED_MESSAGE: &str = "Failed to remove RSS feed";

#[derive(Debug, Clone, Default)]
pub struct PreferencesState {
    current: Option<Preferences>,
    loading: bool,
    /// Soft error from the latest load; `current` is kept.
    error: bool,
    generation: u64,
}

impl PreferencesState {
    pub fn current(&self) -> Option<&Preferences> {
        self.current.as_ref()
    }

    pub fn custom_feeds(&self) -> &[String] {
        self.current
            .as_ref()
            .map(|p| p.custom_rss_feeds.as_slice())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Install a copy fetched outside the load slot (the session check).
    pub(crate) fn seed(&mut self, prefs: Preferences) {
        if self.current.is_none() {
            self.current = Some(prefs);
        }
    }

    pub(crate) fn begin_load(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        self.generation
    }

    /// Returns false for a result superseded by a newer load.
    pub(crate) fn apply(&mut self, generation: u64, result: &Result<Preferences, ApiError>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        match result {
            Ok(prefs) => {
                self.current = Some(prefs.clone());
                self.error = false;
            }
            Err(_) => self.error = true,
        }
        true
    }
}

impl App {
    pub fn load_preferences(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        let generation = self.preferences.begin_load();
        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::debug!(generation, "Loading preferences");

        spawn_event("preferences_load", event_tx, async move {
            AppEvent::PreferencesLoaded {
                epoch,
                generation,
                result: gateway.fetch_preferences().await,
            }
        });
    }

    /// Persist the category selection. An empty set is rejected inline.
    pub fn update_categories(
        &mut self,
        categories: BTreeSet<Category>,
        event_tx: &mpsc::Sender<AppEvent>,
    ) -> Result<(), ApiError> {
        if categories.is_empty() {
            let err = ApiError::Validation(NO_CATEGORY_MESSAGE.to_string());
            self.set_picker_error(Some(NO_CATEGORY_MESSAGE.to_string()));
            return Err(err);
        }
        self.set_picker_saving(true);
        self.set_picker_error(None);

        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::info!(count = categories.len(), "Saving categories");

        spawn_event("categories_save", event_tx, async move {
            AppEvent::CategoriesSaved {
                epoch,
                result: gateway.update_categories(&categories).await,
            }
        });
        Ok(())
    }

    /// Subscribe to a custom RSS feed. Blank input is ignored.
    pub fn add_custom_feed(&mut self, url: &str, event_tx: &mpsc::Sender<AppEvent>) -> bool {
        let Some(url) = non_blank(url) else {
            return false;
        };
        let url = url.to_string();
        self.set_feed_busy(true);

        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::info!(feed_url = %url, "Adding custom feed");

        spawn_event("feed_add", event_tx, async move {
            let result = gateway.add_feed(&url).await;
            AppEvent::CustomFeedChanged {
                epoch,
                change: FeedChange::Added(url),
                result,
            }
        });
        true
    }

    /// Remove a custom feed, identified by its exact URL.
    pub fn remove_custom_feed(&mut self, url: &str, event_tx: &mpsc::Sender<AppEvent>) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        let url = url.to_string();
        self.set_feed_busy(true);

        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::info!(feed_url = %url, "Removing custom feed");

        spawn_event("feed_remove", event_tx, async move {
            let result = gateway.remove_feed(&url).await;
            AppEvent::CustomFeedChanged {
                epoch,
                change: FeedChange::Removed(url),
                result,
            }
        });
        true
    }

    pub(crate) async fn on_preferences_loaded(
        &mut self,
        generation: u64,
        result: Result<Preferences, ApiError>,
    ) {
        if !self.preferences.apply(generation, &result) {
            tracing::debug!(got = generation, "Ignoring stale preferences (generation mismatch)");
            return;
        }
        match result {
            Ok(prefs) => {
                self.session.confirm();
                if let Dialog::Settings(settings) = &mut self.dialog {
                    let last = prefs.custom_rss_feeds.len().saturating_sub(1);
                    settings.feed_cursor = settings.feed_cursor.min(last);
                }
            }
            Err(e) if e.is_authorization() => {
                self.reset_session(EndReason::Unauthorized).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load preferences");
            }
        }
    }

    pub(crate) async fn on_categories_saved(
        &mut self,
        result: Result<(), ApiError>,
        event_tx: &mpsc::Sender<AppEvent>,
    ) {
        self.set_picker_saving(false);
        match result {
            Ok(()) => {
                tracing::info!("Categories saved");
                if self.onboarding.categories_saved() {
                    self.enter_ready(event_tx);
                } else {
                    self.set_status("Preferences saved");
                    self.load_preferences(event_tx);
                    self.load_default_feed(event_tx);
                }
                if matches!(self.dialog, Dialog::Settings(_)) {
                    self.dialog = Dialog::None;
                }
            }
            Err(e) if e.is_authorization() => {
                self.reset_session(EndReason::Unauthorized).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save categories");
                self.set_picker_error(Some(SAVE_FAILED_MESSAGE.to_string()));
            }
        }
    }

    pub(crate) async fn on_custom_feed_changed(
        &mut self,
        change: FeedChange,
        result: Result<(), ApiError>,
        event_tx: &mpsc::Sender<AppEvent>,
    ) {
        self.set_feed_busy(false);
        match (&change, &result) {
            (_, Err(e)) if e.is_authorization() => {
                self.reset_session(EndReason::Unauthorized).await;
                return;
            }
            (FeedChange::Added(url), Ok(())) => {
                tracing::info!(feed_url = %url, "Custom feed added");
                if let Dialog::Settings(settings) = &mut self.dialog {
                    settings.feed_input.clear();
                    settings.feed_error = None;
                }
            }
            (FeedChange::Removed(url), Ok(())) => {
                tracing::info!(feed_url = %url, "Custom feed removed");
                if let Dialog::Settings(settings) = &mut self.dialog {
                    settings.feed_error = None;
                }
            }
            (change, Err(e)) => {
                tracing::warn!(?change, error = %e, "Custom feed change failed");
                let msg = match change {
                    FeedChange::Added(_) => ADD_FEED_FAILED_MESSAGE,
                    FeedChange::Removed(_) => REMOVE_FEED_FAILED_MESSAGE,
                };
                match &mut self.dialog {
                    Dialog::Settings(settings) => settings.feed_error = Some(msg.to_string()),
                    _ => self.set_status(msg),
                }
            }
        }

        self.load_preferences(event_tx);
        self.load_default_feed(event_tx);
    }

    fn set_picker_error(&mut self, error: Option<String>) {
        match &mut self.dialog {
            Dialog::Settings(settings) => settings.picker.error = error,
            _ => self.category_picker.error = error,
        }
    }

    fn set_picker_saving(&mut self, saving: bool) {
        self.category_picker.saving = saving;
        if let Dialog::Settings(settings) = &mut self.dialog {
            settings.picker.saving = saving;
        }
    }

    fn set_feed_busy(&mut self, busy: bool) {
        if let Dialog::Settings(settings) = &mut self.dialog {
            settings.feed_busy = busy;
        }
    }
}
