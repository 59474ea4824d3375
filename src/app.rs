use crate::api::{ApiError, Article, Category, Gateway, Preferences};
use crate::config::Config;
use crate::controller::{FeedMode, FeedState, Onboarding, OnboardingPhase, PreferencesState, SummaryCache};
use crate::session::{EndReason, SessionStore};
use crate::storage::Database;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::collections::BTreeSet;
use tokio::time::Instant;

// ============================================================================
// Auth Form
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Email,
    Password,
    Name,
}

/// Login/signup form shown while onboarding needs authentication.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub focus: AuthField,
    pub email: String,
    pub password: String,
    pub name: String,
    /// Inline error from the last submission.
    pub error: Option<String>,
    pub submitting: bool,
}

impl AuthForm {
    /// Fields shown for the current mode, in tab order.
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Login => &[AuthField::Email, AuthField::Password],
            AuthMode::Signup => &[AuthField::Name, AuthField::Email, AuthField::Password],
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        };
        self.focus = self.fields()[0];
        self.error = None;
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Name => &mut self.name,
        }
    }
}

// ============================================================================
// Category Picker
// ============================================================================

/// Multi-select over the category vocabulary.
///
/// Used standalone while onboarding needs categories, and embedded in the
/// settings dialog afterwards.
#[derive(Debug, Clone, Default)]
pub struct CategoryPicker {
    pub cursor: usize,
    pub selected: BTreeSet<Category>,
    pub error: Option<String>,
    pub saving: bool,
}

impl CategoryPicker {
    pub fn with_selection(selected: BTreeSet<Category>) -> Self {
        Self {
            selected,
            ..Self::default()
        }
    }

    pub fn toggle_current(&mut self) {
        let Some(category) = Category::ALL.get(self.cursor).copied() else {
            return;
        };
        if !self.selected.remove(&category) {
            self.selected.insert(category);
        }
        self.error = None;
    }

    pub fn move_cursor(&mut self, down: bool) {
        let last = Category::ALL.len() - 1;
        self.cursor = if down {
            (self.cursor + 1).min(last)
        } else {
            self.cursor.saturating_sub(1)
        };
    }
}

// ============================================================================
// Dialogs
// ============================================================================

/// Summary overlay for one article. The content is read from the summary
/// cache by link on every frame.
#[derive(Debug, Clone)]
pub struct SummaryDialog {
    pub link: String,
    pub title: String,
    pub scroll: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSection {
    #[default]
    Categories,
    Feeds,
}

/// Settings overlay: categories plus custom RSS feeds.
#[derive(Debug, Clone, Default)]
pub struct SettingsDialog {
    pub section: SettingsSection,
    pub picker: CategoryPicker,
    pub feed_input: String,
    /// Index into `custom_rss_feeds` of the highlighted feed.
    pub feed_cursor: usize,
    pub feed_error: Option<String>,
    pub feed_busy: bool,
}

#[derive(Debug, Clone, Default)]
pub enum Dialog {
    #[default]
    None,
    Summary(SummaryDialog),
    Settings(SettingsDialog),
}

/// Which widget receives keystrokes on the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Browse,
    Search,
}

// ============================================================================
// Application Events
// ============================================================================

/// What a custom feed mutation did, for messages and input clearing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedChange {
    Added(String),
    Removed(String),
}

/// Completion of a background task.
///
/// Every variant except `TaskPanicked` carries the session epoch the task was
/// started under; events from an earlier session are dropped unprocessed.
#[derive(Debug)]
pub enum AppEvent {
    /// Preferences check after restore or login.
    SessionChecked {
        epoch: u64,
        result: Result<Preferences, ApiError>,
    },
    AuthCompleted {
        epoch: u64,
        result: Result<String, ApiError>,
    },
    /// Default feed or search results for the display slot.
    FeedLoaded {
        epoch: u64,
        generation: u64,
        mode: FeedMode,
        result: Result<Vec<Article>, ApiError>,
    },
    PreferencesLoaded {
        epoch: u64,
        generation: u64,
        result: Result<Preferences, ApiError>,
    },
    CategoriesSaved {
        epoch: u64,
        result: Result<(), ApiError>,
    },
    CustomFeedChanged {
        epoch: u64,
        change: FeedChange,
        result: Result<(), ApiError>,
    },
    /// Summarization finished for `link`; `ticket` identifies the request.
    SummaryResolved {
        epoch: u64,
        link: String,
        ticket: u64,
        result: Result<String, ApiError>,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "feed_load", "summary")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

impl AppEvent {
    pub fn epoch(&self) -> Option<u64> {
        match self {
            AppEvent::SessionChecked { epoch, .. }
            | AppEvent::AuthCompleted { epoch, .. }
            | AppEvent::FeedLoaded { epoch, .. }
            | AppEvent::PreferencesLoaded { epoch, .. }
            | AppEvent::CategoriesSaved { epoch, .. }
            | AppEvent::CustomFeedChanged { epoch, .. }
            | AppEvent::SummaryResolved { epoch, .. } => Some(*epoch),
            AppEvent::TaskPanicked { .. } => None,
        }
    }
}

// ============================================================================
// App
// ============================================================================

/// Process-wide state container.
///
/// Mutated only from the event loop: user input and `AppEvent`s from
/// background tasks are handled one at a time, so no field needs a lock.
pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub gateway: Gateway,

    pub onboarding: Onboarding,
    pub feed: FeedState,
    pub summaries: SummaryCache,
    pub preferences: PreferencesState,

    pub auth_form: AuthForm,
    pub category_picker: CategoryPicker,
    pub input_mode: InputMode,
    pub search_input: String,
    pub selected_article: usize,
    pub dialog: Dialog,

    /// Transient status bar message with the time it was set.
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,
}

impl App {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let session = SessionStore::new(db);
        let gateway = Gateway::new(&config, session.credential()).context("Failed to build HTTP client")?;

        Ok(Self {
            config,
            session,
            gateway,
            onboarding: Onboarding::default(),
            feed: FeedState::default(),
            summaries: SummaryCache::default(),
            preferences: PreferencesState::default(),
            auth_form: AuthForm::default(),
            category_picker: CategoryPicker::default(),
            input_mode: InputMode::default(),
            search_input: String::new(),
            selected_article: 0,
            dialog: Dialog::None,
            status_message: None,
            needs_redraw: true,
        })
    }

    pub fn phase(&self) -> OnboardingPhase {
        self.onboarding.phase()
    }

    pub fn selected(&self) -> Option<&Article> {
        self.feed.articles().get(self.selected_article)
    }

    pub fn nav_up(&mut self) {
        self.selected_article = self.selected_article.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        if self.selected_article + 1 < self.feed.articles().len() {
            self.selected_article += 1;
        }
    }

    /// Keep the selection inside the current article set.
    pub fn clamp_selection(&mut self) {
        let len = self.feed.articles().len();
        if len == 0 {
            self.selected_article = 0;
        } else if self.selected_article >= len {
            self.selected_article = len - 1;
        }
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once its display time has passed.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= self.config.status_message_ttl() {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// End the session and return every piece of session-derived state to
    /// its initial value.
    ///
    /// The session epoch moves on, so results of requests still in flight
    /// are discarded when they arrive.
    pub async fn reset_session(&mut self, reason: EndReason) {
        self.session.end(reason).await;

        self.onboarding.reset();
        self.feed = FeedState::default();
        self.summaries = SummaryCache::default();
        self.preferences = PreferencesState::default();

        self.auth_form = AuthForm::default();
        self.category_picker = CategoryPicker::default();
        self.input_mode = InputMode::Browse;
        self.search_input.clear();
        self.selected_article = 0;
        self.dialog = Dialog::None;
        self.needs_redraw = true;

        if reason == EndReason::Unauthorized {
            self.set_status("Session expired. Please sign in again.");
        }
    }

    /// The latest feed request was a search (its results may still be pending).
    pub fn is_searching(&self) -> bool {
        matches!(self.feed.requested(), FeedMode::Search(_))
    }
}
