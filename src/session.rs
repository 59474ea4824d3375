//! Session store: the credential, its persistence, and the session epoch.
//!
//! The credential is the only piece of state written from several places
//! (login, signup, logout, authorization-failure handling). Writes replace the
//! whole value under a lock (last writer wins); the request gateway reads the
//! latest value synchronously right before dispatching each request.
//!
//! The epoch increments on every session change. Background work records the
//! epoch it was started under, and results from an older epoch are discarded,
//! so nothing started before a logout can leak into the next session.
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::storage::{Database, DatabaseError};

/// Key of the credential row in the client state table.
pub const CREDENTIAL_KEY: &str = "auth.token";

// ============================================================================
// Credential Handle
// ============================================================================

/// Shared, synchronously readable slot for the bearer credential.
#[derive(Clone, Default)]
pub struct CredentialHandle {
    inner: Arc<RwLock<Option<SecretString>>>,
}

impl CredentialHandle {
    /// Snapshot of the current credential.
    pub fn current(&self) -> Option<SecretString> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_present(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    fn replace(&self, value: Option<SecretString>) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}

/// Never print the credential.
impl fmt::Debug for CredentialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHandle")
            .field("credential", &self.is_present().then_some("[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Session Store
// ============================================================================

/// Authentication status derived from credential presence and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No credential.
    Unauthenticated,
    /// Restored from disk, not yet validated by a privileged request.
    Provisional,
    /// Issued by login/signup in this run, or validated after restore.
    Authenticated,
}

/// Why a session ended. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Logout,
    Unauthorized,
}

pub struct SessionStore {
    db: Database,
    credential: CredentialHandle,
    status: SessionStatus,
    epoch: u64,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            credential: CredentialHandle::default(),
            status: SessionStatus::Unauthenticated,
            epoch: 0,
        }
    }

    /// Handle shared with the request gateway.
    pub fn credential(&self) -> CredentialHandle {
        self.credential.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status != SessionStatus::Unauthenticated
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Load a persisted credential, if any.
    ///
    /// No network call happens here: a found credential makes the session
    /// provisional until the first privileged request confirms or rejects it.
    pub async fn restore(&mut self) -> Result<SessionStatus, DatabaseError> {
        let stored = self.db.get_state_entry(CREDENTIAL_KEY).await?;
        match stored.filter(|entry| !entry.value.trim().is_empty()) {
            Some(entry) => {
                self.credential.replace(Some(SecretString::from(entry.value)));
                self.status = SessionStatus::Provisional;
                tracing::info!(
                    stored_at = entry.updated_at,
                    "Restored stored credential (pending validation)"
                );
            }
            None => {
                self.credential.replace(None);
                self.status = SessionStatus::Unauthenticated;
                tracing::info!("No stored credential");
            }
        }
        Ok(self.status)
    }

    /// A privileged request succeeded with the current credential.
    pub fn confirm(&mut self) {
        if self.status == SessionStatus::Provisional {
            tracing::debug!("Stored credential validated");
            self.status = SessionStatus::Authenticated;
        }
    }

    /// Install a freshly issued credential and start a new session.
    ///
    /// The in-memory credential is set before persisting, so the session is
    /// usable even if the disk write fails; the error tells the caller the
    /// login will not survive a restart.
    pub async fn establish(&mut self, token: String) -> Result<(), DatabaseError> {
        self.credential.replace(Some(SecretString::from(token.clone())));
        self.status = SessionStatus::Authenticated;
        self.epoch = self.epoch.wrapping_add(1);
        tracing::info!(epoch = self.epoch, "Session established");

        self.db.set_state(CREDENTIAL_KEY, &token).await
    }

    /// Drop the credential everywhere and invalidate all in-flight work.
    ///
    /// Failing to delete the persisted copy is logged but not returned: the
    /// in-memory session is over regardless.
    pub async fn end(&mut self, reason: EndReason) {
        self.credential.replace(None);
        self.status = SessionStatus::Unauthenticated;
        self.epoch = self.epoch.wrapping_add(1);
        tracing::info!(?reason, epoch = self.epoch, "Session ended");

        if let Err(e) = self.db.delete_state(CREDENTIAL_KEY).await {
            tracing::error!(error = %e, "Failed to delete stored credential");
        }
    }

    /// Bearer header value for the current credential, if any.
    pub(crate) fn bearer(handle: &CredentialHandle) -> Option<String> {
        handle
            .current()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }
}
