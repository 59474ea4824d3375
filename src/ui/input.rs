//! Input handling for the TUI.
//!
//! Keys go to the open dialog first, then to the screen for the current
//! onboarding phase.

use crate::api::Article;
use crate::app::{
    App, AppEvent, CategoryPicker, Dialog, InputMode, SettingsDialog, SettingsSection, SummaryDialog,
};
use crate::controller::{OnboardingPhase, SummaryEntry};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::open_link;
use super::Action;

pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    match app.dialog {
        Dialog::Summary(_) => return Ok(handle_summary_input(app, code, event_tx)),
        Dialog::Settings(_) => return Ok(handle_settings_input(app, code, modifiers, event_tx)),
        Dialog::None => {}
    }

    match app.phase() {
        OnboardingPhase::Unknown => handle_splash_input(app, code, event_tx).await,
        OnboardingPhase::NeedsAuth if app.awaiting_session_check() => {
            handle_splash_input(app, code, event_tx).await
        }
        OnboardingPhase::NeedsAuth => Ok(handle_auth_input(app, code, modifiers, event_tx)),
        OnboardingPhase::NeedsCategories => handle_categories_input(app, code, event_tx).await,
        OnboardingPhase::Ready => match app.input_mode {
            InputMode::Search => Ok(handle_search_input(app, code, event_tx)),
            InputMode::Browse => handle_browse_input(app, code, event_tx).await,
        },
    }
}

async fn handle_splash_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(Action::Quit),
        KeyCode::Char('r') if app.onboarding.is_unreachable() => app.check_session(event_tx),
        KeyCode::Char('L') => app.logout().await,
        _ => {}
    }
    Ok(Action::Continue)
}

fn handle_auth_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if app.auth_form.submitting {
        return if code == KeyCode::Esc {
            Action::Quit
        } else {
            Action::Continue
        };
    }

    match code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Char('t') if modifiers.contains(KeyModifiers::CONTROL) => app.auth_form.toggle_mode(),
        KeyCode::Tab | KeyCode::Down => app.auth_form.focus_next(),
        KeyCode::Enter => app.submit_auth(event_tx),
        KeyCode::Backspace => {
            app.auth_form.focused_value_mut().pop();
        }
        KeyCode::Char(c) if !c.is_control() => {
            app.auth_form.focused_value_mut().push(c);
            app.auth_form.error = None;
        }
        _ => {}
    }
    Action::Continue
}

async fn handle_categories_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(Action::Quit),
        KeyCode::Char('L') => app.logout().await,
        _ if app.category_picker.saving => {}
        KeyCode::Char('j') | KeyCode::Down => app.category_picker.move_cursor(true),
        KeyCode::Char('k') | KeyCode::Up => app.category_picker.move_cursor(false),
        KeyCode::Char(' ') => app.category_picker.toggle_current(),
        KeyCode::Enter => {
            let selected = app.category_picker.selected.clone();
            // A rejected selection is reported on the picker
            let _ = app.update_categories(selected, event_tx);
        }
        _ => {}
    }
    Ok(Action::Continue)
}

async fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('/') => app.input_mode = InputMode::Search,
        KeyCode::Char('c') | KeyCode::Esc if app.is_searching() => app.clear_search(event_tx),
        KeyCode::Char('r') => {
            if app.is_searching() {
                let query = app.search_input.clone();
                let _ = app.search(&query, event_tx);
            } else {
                app.load_default_feed(event_tx);
            }
        }
        KeyCode::Enter => {
            if let Some(article) = app.selected().cloned() {
                open_summary(app, &article, event_tx);
            }
        }
        KeyCode::Char('o') => {
            if let Some(link) = app.selected().map(|a| a.link.clone()) {
                if let Err(e) = open_link(&link) {
                    app.set_status(e);
                }
            }
        }
        KeyCode::Char('s') => open_settings(app),
        KeyCode::Char('L') => app.logout().await,
        _ => {}
    }
    Ok(Action::Continue)
}

fn handle_search_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Browse;
            if app.search_input.trim().is_empty() && app.is_searching() {
                app.clear_search(event_tx);
            }
        }
        KeyCode::Enter => {
            let query = app.search_input.clone();
            if query.trim().is_empty() {
                if app.is_searching() {
                    app.clear_search(event_tx);
                }
                app.input_mode = InputMode::Browse;
            } else if app.search(&query, event_tx).is_ok() {
                app.input_mode = InputMode::Browse;
            }
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) if !c.is_control() => app.search_input.push(c),
        _ => {}
    }
    Action::Continue
}

fn handle_summary_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    let Dialog::Summary(dialog) = &mut app.dialog else {
        return Action::Continue;
    };

    match code {
        KeyCode::Esc | KeyCode::Char('q') => app.dialog = Dialog::None,
        KeyCode::Char('j') | KeyCode::Down => dialog.scroll = dialog.scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => dialog.scroll = dialog.scroll.saturating_sub(1),
        KeyCode::Char('o') => {
            let link = dialog.link.clone();
            if let Err(e) = open_link(&link) {
                app.set_status(e);
            }
        }
        KeyCode::Char('r') => {
            let link = dialog.link.clone();
            if matches!(app.summaries.get(&link), Some(SummaryEntry::Failed(_))) {
                app.get_summary(&link, event_tx);
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_settings_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let feed_count = app.preferences.custom_feeds().len();
    let Dialog::Settings(dialog) = &mut app.dialog else {
        return Action::Continue;
    };

    match (dialog.section, code) {
        (_, KeyCode::Esc) => app.dialog = Dialog::None,
        (SettingsSection::Categories, KeyCode::Tab) => dialog.section = SettingsSection::Feeds,
        (SettingsSection::Feeds, KeyCode::Tab) => dialog.section = SettingsSection::Categories,

        (SettingsSection::Categories, _) if dialog.picker.saving => {}
        (SettingsSection::Categories, KeyCode::Char('j') | KeyCode::Down) => dialog.picker.move_cursor(true),
        (SettingsSection::Categories, KeyCode::Char('k') | KeyCode::Up) => dialog.picker.move_cursor(false),
        (SettingsSection::Categories, KeyCode::Char(' ')) => dialog.picker.toggle_current(),
        (SettingsSection::Categories, KeyCode::Enter) => {
            let selected = dialog.picker.selected.clone();
            // A rejected selection is reported on the picker
            let _ = app.update_categories(selected, event_tx);
        }

        (SettingsSection::Feeds, _) if dialog.feed_busy => {}
        (SettingsSection::Feeds, KeyCode::Down) => {
            if dialog.feed_cursor + 1 < feed_count {
                dialog.feed_cursor += 1;
            }
        }
        (SettingsSection::Feeds, KeyCode::Up) => dialog.feed_cursor = dialog.feed_cursor.saturating_sub(1),
        (SettingsSection::Feeds, KeyCode::Enter) => {
            let url = dialog.feed_input.clone();
            dialog.feed_error = None;
            app.add_custom_feed(&url, event_tx);
        }
        (SettingsSection::Feeds, KeyCode::Char('d')) if modifiers.contains(KeyModifiers::CONTROL) => {
            let cursor = dialog.feed_cursor;
            dialog.feed_error = None;
            if let Some(url) = app.preferences.custom_feeds().get(cursor).cloned() {
                app.remove_custom_feed(&url, event_tx);
            }
        }
        (SettingsSection::Feeds, KeyCode::Backspace) => {
            dialog.feed_input.pop();
        }
        (SettingsSection::Feeds, KeyCode::Char(c)) if !c.is_control() => dialog.feed_input.push(c),
        _ => {}
    }
    Action::Continue
}

fn open_summary(app: &mut App, article: &Article, event_tx: &mpsc::Sender<AppEvent>) {
    app.get_summary(&article.link, event_tx);
    app.dialog = Dialog::Summary(SummaryDialog {
        link: article.link.clone(),
        title: article.title.clone(),
        scroll: 0,
    });
}

/// Open settings with the picker preset from the latest preferences copy.
fn open_settings(app: &mut App) {
    let selected = app
        .preferences
        .current()
        .map(|p| p.known_categories())
        .unwrap_or_default();
    app.dialog = Dialog::Settings(SettingsDialog {
        picker: CategoryPicker::with_selection(selected),
        ..SettingsDialog::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::Database;

    /// Signed in with a fresh token whose preferences check failed.
    async fn signed_in_but_unchecked() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let mut app = App::new(Config::default(), db).unwrap();
        app.onboarding.credential_missing();
        app.session.establish("t".into()).await.unwrap();
        app.onboarding.check_failed();
        app
    }

    #[tokio::test]
    async fn test_retry_key_rechecks_after_failed_post_login_check() {
        let mut app = signed_in_but_unchecked().await;
        let (tx, _rx) = mpsc::channel(8);
        assert_eq!(app.phase(), OnboardingPhase::NeedsAuth);
        assert!(app.awaiting_session_check());

        handle_input(&mut app, KeyCode::Char('r'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert!(app.onboarding.is_checking());
        assert!(app.auth_form.email.is_empty());
    }

    #[tokio::test]
    async fn test_auth_form_inactive_while_signed_in() {
        let mut app = signed_in_but_unchecked().await;
        let (tx, _rx) = mpsc::channel(8);

        handle_input(&mut app, KeyCode::Char('x'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert!(app.auth_form.email.is_empty());
        assert!(!app.onboarding.is_checking());
    }

    #[tokio::test]
    async fn test_auth_form_receives_keys_when_signed_out() {
        let db = Database::open(":memory:").await.unwrap();
        let mut app = App::new(Config::default(), db).unwrap();
        app.onboarding.credential_missing();
        let (tx, _rx) = mpsc::channel(8);

        handle_input(&mut app, KeyCode::Char('r'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert_eq!(app.auth_form.email, "r");
    }
}
