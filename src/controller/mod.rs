//! State machines and operations for the session-derived slots.
//!
//! Each submodule owns a plain state struct with pure transitions plus the
//! `impl App` operations that spawn backend requests. Results come back as
//! [`AppEvent`]s and are applied by [`handle_app_event`] on the event loop.
//!
//! # Module Structure
//!
//! - `session` - login, signup, logout
//! - `onboarding` - Unknown → NeedsAuth → NeedsCategories → Ready
//! - `feed` - default feed and search for the single display slot
//! - `summary` - per-link memoized summaries
//! - `preferences` - categories and custom RSS feeds
//! - `events` - applies background results to `App`

mod events;
mod feed;
mod onboarding;
mod preferences;
mod session;
mod summary;

pub use events::handle_app_event;
pub use feed::{FeedMode, FeedState};
pub use onboarding::{Onboarding, OnboardingPhase};
pub use preferences::PreferencesState;
pub use summary::{SummaryCache, SummaryEntry, SummaryLookup, SUMMARY_FAILED_MESSAGE};

use crate::app::AppEvent;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(crate) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Run `work` in the background and deliver the event it produces.
///
/// A panic inside `work` is reported as `AppEvent::TaskPanicked` instead.
pub(crate) fn spawn_event<F>(task: &'static str, event_tx: &mpsc::Sender<AppEvent>, work: F)
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(work).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                AppEvent::TaskPanicked { task, error }
            }
        };

        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Failed to send task result (receiver dropped)");
        }
    });
}
