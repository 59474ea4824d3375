//! Onboarding state machine.
//!
//! ```text
//! Unknown ──no credential──────────────► NeedsAuth
//!    │                                      │ login/signup ok
//!    └──credential + preferences ◄──────────┘
//!            │ empty categories      │ some categories
//!            ▼                       ▼
//!      NeedsCategories ──saved──► Ready (terminal for the session)
//! ```
//!
//! Any state returns to NeedsAuth on logout or an authorization failure.
use crate::api::{ApiError, Preferences};
use crate::app::{App, AppEvent};
use crate::session::{EndReason, SessionStatus};
use tokio::sync::mpsc;

use super::spawn_event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnboardingPhase {
    #[default]
    Unknown,
    NeedsAuth,
    NeedsCategories,
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct Onboarding {
    phase: OnboardingPhase,
    /// A preferences check is in flight.
    checking: bool,
    /// The last preferences check failed for a reason other than
    /// authorization; the user may retry.
    unreachable: bool,
}

impl Onboarding {
    pub fn phase(&self) -> OnboardingPhase {
        self.phase
    }

    pub fn is_checking(&self) -> bool {
        self.checking
    }

    pub fn is_unreachable(&self) -> bool {
        self.unreachable
    }

    pub(crate) fn credential_missing(&mut self) {
        if self.phase == OnboardingPhase::Unknown {
            self.phase = OnboardingPhase::NeedsAuth;
        }
    }

    pub(crate) fn begin_check(&mut self) {
        self.checking = true;
        self.unreachable = false;
    }

    pub(crate) fn check_failed(&mut self) {
        self.checking = false;
        self.unreachable = true;
    }

    /// Apply the result of a preferences check. Returns true when this
    /// transition entered Ready.
    pub(crate) fn preferences_known(&mut self, prefs: &Preferences) -> bool {
        self.checking = false;
        self.unreachable = false;
        if self.phase == OnboardingPhase::Ready {
            return false;
        }
        self.phase = if prefs.has_categories() {
            OnboardingPhase::Ready
        } else {
            OnboardingPhase::NeedsCategories
        };
        self.phase == OnboardingPhase::Ready
    }

    /// Categories were persisted. Returns true when this entered Ready.
    pub(crate) fn categories_saved(&mut self) -> bool {
        if self.phase == OnboardingPhase::NeedsCategories {
            self.phase = OnboardingPhase::Ready;
            true
        } else {
            false
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self {
            phase: OnboardingPhase::NeedsAuth,
            ..Self::default()
        };
    }
}

impl App {
    /// Restore the persisted session and work out where onboarding starts.
    pub async fn start(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        let status = match self.session.restore().await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stored credential");
                self.set_status("Could not read saved session");
                SessionStatus::Unauthenticated
            }
        };

        match status {
            SessionStatus::Unauthenticated => self.onboarding.credential_missing(),
            SessionStatus::Provisional | SessionStatus::Authenticated => {
                self.check_session(event_tx)
            }
        }
        self.needs_redraw = true;
    }

    /// Fetch preferences to decide between NeedsCategories and Ready.
    ///
    /// Also serves as the retry after an unreachable backend.
    pub fn check_session(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        if !self.session.is_authenticated() || self.onboarding.is_checking() {
            return;
        }
        self.onboarding.begin_check();

        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::debug!(epoch, "Checking session preferences");

        spawn_event("session_check", event_tx, async move {
            AppEvent::SessionChecked {
                epoch,
                result: gateway.fetch_preferences().await,
            }
        });
    }

    /// Signed in, but no preferences check has succeeded yet. The screen
    /// for this state is the splash (spinner or retry), not the auth form.
    pub fn awaiting_session_check(&self) -> bool {
        self.session.is_authenticated()
            && matches!(self.phase(), OnboardingPhase::Unknown | OnboardingPhase::NeedsAuth)
    }

    /// Entering Ready loads the initial feed and a fresh preferences copy.
    pub(crate) fn enter_ready(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        tracing::info!("Onboarding complete");
        self.load_default_feed(event_tx);
        self.load_preferences(event_tx);
    }

    pub(crate) async fn on_session_checked(
        &mut self,
        result: Result<Preferences, ApiError>,
        event_tx: &mpsc::Sender<AppEvent>,
    ) {
        match result {
            Ok(prefs) => {
                self.session.confirm();
                let entered_ready = self.onboarding.preferences_known(&prefs);
                tracing::info!(phase = ?self.phase(), "Session check complete");
                if self.phase() == OnboardingPhase::NeedsCategories {
                    self.category_picker.selected = prefs.known_categories();
                }
                self.preferences.seed(prefs);
                if entered_ready {
                    self.enter_ready(event_tx);
                }
            }
            Err(e) if e.is_authorization() => {
                tracing::warn!(error = %e, "Stored credential rejected");
                self.reset_session(EndReason::Unauthorized).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed");
                self.onboarding.check_failed();
                self.set_status("Could not reach server. Press r to retry.");
            }
        }
    }
}
