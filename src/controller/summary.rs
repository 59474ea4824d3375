//! Per-link article summaries.
//!
//! At most one request per link is in flight. A successful summary is kept
//! for the rest of the session; a failed one is retried on the next request.
use crate::api::ApiError;
use crate::app::{App, AppEvent};
use crate::session::EndReason;
use std::collections::HashMap;
use tokio::sync::mpsc;

use super::spawn_event;

pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to generate summary. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryEntry {
    /// Request in flight; only a completion carrying this ticket resolves it.
    Pending { ticket: u64 },
    Ready(String),
    Failed(ApiError),
}

/// What `SummaryCache::begin` decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryLookup {
    Ready(String),
    /// Already requested; wait for the same outcome.
    Pending,
    /// Caller must dispatch a request tagged with this ticket.
    Spawn(u64),
}

#[derive(Debug, Default)]
pub struct SummaryCache {
    entries: HashMap<String, SummaryEntry>,
    next_ticket: u64,
}

impl SummaryCache {
    pub fn get(&self, link: &str) -> Option<&SummaryEntry> {
        self.entries.get(link)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn begin(&mut self, link: &str) -> SummaryLookup {
        match self.entries.get(link) {
            Some(SummaryEntry::Ready(text)) => SummaryLookup::Ready(text.clone()),
            Some(SummaryEntry::Pending { .. }) => SummaryLookup::Pending,
            Some(SummaryEntry::Failed(_)) | None => {
                self.next_ticket = self.next_ticket.wrapping_add(1);
                let ticket = self.next_ticket;
                self.entries
                    .insert(link.to_string(), SummaryEntry::Pending { ticket });
                SummaryLookup::Spawn(ticket)
            }
        }
    }

    /// Record a completion. Returns false (and changes nothing) when the
    /// entry is no longer waiting for `ticket`.
    pub fn resolve(&mut self, link: &str, ticket: u64, result: Result<String, ApiError>) -> bool {
        match self.entries.get_mut(link) {
            Some(entry) if *entry == (SummaryEntry::Pending { ticket }) => {
                *entry = match result {
                    Ok(text) => SummaryEntry::Ready(text),
                    Err(e) => SummaryEntry::Failed(e),
                };
                true
            }
            _ => false,
        }
    }
}

impl App {
    /// Return a cached summary, join an in-flight request, or start one.
    pub fn get_summary(&mut self, link: &str, event_tx: &mpsc::Sender<AppEvent>) -> SummaryLookup {
        let lookup = self.summaries.begin(link);
        if let SummaryLookup::Spawn(ticket) = lookup {
            let gateway = self.gateway.clone();
            let epoch = self.session.epoch();
            let link = link.to_string();
            tracing::debug!(link = %link, ticket, "Requesting summary");

            spawn_event("summary", event_tx, async move {
                let result = gateway.summarize(&link).await;
                AppEvent::SummaryResolved {
                    epoch,
                    link,
                    ticket,
                    result,
                }
            });
        }
        lookup
    }

    pub(crate) async fn on_summary_resolved(
        &mut self,
        link: String,
        ticket: u64,
        result: Result<String, ApiError>,
    ) {
        let unauthorized = matches!(&result, Err(e) if e.is_authorization());
        if let Err(e) = &result {
            tracing::warn!(link = %link, error = %e, "Summary request failed");
        }

        if !self.summaries.resolve(&link, ticket, result) {
            tracing::debug!(link = %link, ticket, "Ignoring stale summary result");
            return;
        }

        if unauthorized {
            self.reset_session(EndReason::Unauthorized).await;
        } else {
            self.session.confirm();
        }
    }
}
