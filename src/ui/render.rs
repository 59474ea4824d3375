//! Render functions for the TUI.
//!
//! Dispatches on the onboarding phase, then draws any open dialog on top.

use crate::app::{App, Dialog};
use crate::controller::OnboardingPhase;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use super::helpers::spinner;
use super::{articles, auth, categories, dialogs, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 12;

pub(super) fn render(f: &mut Frame, app: &App, spinner_frame: usize) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.phase() {
        OnboardingPhase::Unknown => render_splash(f, app, chunks[0], spinner_frame),
        OnboardingPhase::NeedsAuth if app.awaiting_session_check() => {
            render_splash(f, app, chunks[0], spinner_frame)
        }
        OnboardingPhase::NeedsAuth => auth::render(f, app, chunks[0], spinner_frame),
        OnboardingPhase::NeedsCategories => categories::render_onboarding(f, app, chunks[0]),
        OnboardingPhase::Ready => articles::render(f, app, chunks[0], spinner_frame),
    }
    status::render(f, app, chunks[1]);

    match &app.dialog {
        Dialog::None => {}
        Dialog::Summary(dialog) => dialogs::render_summary(f, app, dialog, spinner_frame),
        Dialog::Settings(dialog) => dialogs::render_settings(f, app, dialog),
    }
}

/// Shown while the stored session is being checked.
fn render_splash(f: &mut Frame, app: &App, area: Rect, spinner_frame: usize) {
    let text = if app.onboarding.is_unreachable() {
        "Could not reach the server.\n\n[r] retry  [L] sign out  [q] quit".to_string()
    } else {
        format!("{} Loading your news...", spinner(spinner_frame))
    };
    let y = area.y + area.height / 2;
    let line_area = Rect::new(area.x, y.saturating_sub(1), area.width, 3.min(area.height));
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), line_area);
}
