//! Application event handling.
//!
//! Applies background task results to `App`. Results tagged with an older
//! session epoch belong to a session that has since ended and are dropped.
use crate::app::{App, AppEvent};
use tokio::sync::mpsc;

pub async fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(epoch) = event.epoch() {
        let current = app.session.epoch();
        if epoch != current {
            tracing::debug!(
                expected = current,
                got = epoch,
                "Ignoring result from previous session (epoch mismatch)"
            );
            return;
        }
    }
    app.needs_redraw = true;

    match event {
        AppEvent::SessionChecked { result, .. } => {
            app.on_session_checked(result, event_tx).await;
        }
        AppEvent::AuthCompleted { result, .. } => {
            app.on_auth_completed(result, event_tx).await;
        }
        AppEvent::FeedLoaded {
            generation,
            mode,
            result,
            ..
        } => {
            app.on_feed_loaded(generation, mode, result).await;
        }
        AppEvent::PreferencesLoaded {
            generation, result, ..
        } => {
            app.on_preferences_loaded(generation, result).await;
        }
        AppEvent::CategoriesSaved { result, .. } => {
            app.on_categories_saved(result, event_tx).await;
        }
        AppEvent::CustomFeedChanged { change, result, .. } => {
            app.on_custom_feed_changed(change, result, event_tx).await;
        }
        AppEvent::SummaryResolved {
            link, ticket, result, ..
        } => {
            app.on_summary_resolved(link, ticket, result).await;
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Internal error in {task}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Preferences;
    use crate::config::Config;
    use crate::controller::OnboardingPhase;
    use crate::storage::Database;

    #[tokio::test]
    async fn test_event_from_previous_epoch_dropped() {
        let db = Database::open(":memory:").await.unwrap();
        let mut app = App::new(Config::default(), db).unwrap();
        app.session.establish("t".into()).await.unwrap();
        let (tx, _rx) = mpsc::channel(8);

        let stale = AppEvent::SessionChecked {
            epoch: app.session.epoch() - 1,
            result: Ok(Preferences {
                categories: vec!["Tech".into()],
                custom_rss_feeds: Vec::new(),
            }),
        };
        handle_app_event(&mut app, stale, &tx).await;

        assert_eq!(app.phase(), OnboardingPhase::Unknown);
    }

    #[tokio::test]
    async fn test_current_epoch_applied() {
        let db = Database::open(":memory:").await.unwrap();
        let mut app = App::new(Config::default(), db).unwrap();
        app.session.establish("t".into()).await.unwrap();
        let (tx, _rx) = mpsc::channel(8);

        let event = AppEvent::SessionChecked {
            epoch: app.session.epoch(),
            result: Ok(Preferences::default()),
        };
        handle_app_event(&mut app, event, &tx).await;

        assert_eq!(app.phase(), OnboardingPhase::NeedsCategories);
    }
}
