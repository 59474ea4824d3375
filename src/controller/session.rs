use crate::api::{ApiError, AUTH_FAILED_MESSAGE};
use crate::app::{App, AppEvent, AuthMode};
use crate::session::EndReason;
use crate::util::non_blank;
use tokio::sync::mpsc;

use super::spawn_event;

const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";

impl App {
    /// Submit the auth form as login or signup depending on its mode.
    ///
    /// Blank fields are rejected inline without a request.
    pub fn submit_auth(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        if self.auth_form.submitting {
            return;
        }

        let form = &self.auth_form;
        let email = non_blank(&form.email).map(str::to_string);
        let name = non_blank(&form.name).map(str::to_string);
        // Passwords are sent as typed
        let password = (!form.password.is_empty()).then(|| form.password.clone());

        let (email, password) = match (email, password) {
            (Some(email), Some(password)) => (email, password),
            _ => {
                self.auth_form.error = Some(MISSING_FIELDS_MESSAGE.to_string());
                return;
            }
        };

        match self.auth_form.mode {
            AuthMode::Login => self.login(email, password, event_tx),
            AuthMode::Signup => match name {
                Some(name) => self.signup(email, password, name, event_tx),
                None => self.auth_form.error = Some(MISSING_FIELDS_MESSAGE.to_string()),
            },
        }
    }

    pub fn login(&mut self, email: String, password: String, event_tx: &mpsc::Sender<AppEvent>) {
        self.auth_form.submitting = true;
        self.auth_form.error = None;

        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::info!("Logging in");

        spawn_event("login", event_tx, async move {
            AppEvent::AuthCompleted {
                epoch,
                result: gateway.login(&email, &password).await,
            }
        });
    }

    pub fn signup(
        &mut self,
        email: String,
        password: String,
        name: String,
        event_tx: &mpsc::Sender<AppEvent>,
    ) {
        self.auth_form.submitting = true;
        self.auth_form.error = None;

        let gateway = self.gateway.clone();
        let epoch = self.session.epoch();
        tracing::info!("Signing up");

        spawn_event("signup", event_tx, async move {
            AppEvent::AuthCompleted {
                epoch,
                result: gateway.signup(&email, &password, &name).await,
            }
        });
    }

    pub async fn logout(&mut self) {
        self.reset_session(EndReason::Logout).await;
        self.set_status("Signed out");
    }

    /// Authorization failures here are wrong credentials, not an expired
    /// session, so they stay on the form.
    pub(crate) async fn on_auth_completed(
        &mut self,
        result: Result<String, ApiError>,
        event_tx: &mpsc::Sender<AppEvent>,
    ) {
        self.auth_form.submitting = false;
        match result {
            Ok(token) => {
                if let Err(e) = self.session.establish(token).await {
                    tracing::error!(error = %e, "Failed to persist credential");
                    self.set_status("Signed in, but the session could not be saved");
                }
                self.auth_form.password.clear();
                self.auth_form.error = None;
                self.check_session(event_tx);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Authentication failed");
                self.auth_form.error = Some(e.user_message(AUTH_FAILED_MESSAGE));
            }
        }
    }
}
