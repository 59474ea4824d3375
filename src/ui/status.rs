use crate::app::{App, Dialog, InputMode};
use crate::controller::OnboardingPhase;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: &str = if let Some((msg, _)) = &app.status_message {
        msg.as_ref()
    } else if !matches!(app.dialog, Dialog::None) {
        ""
    } else {
        match app.phase() {
            OnboardingPhase::NeedsAuth if !app.awaiting_session_check() => "[Esc] quit",
            OnboardingPhase::NeedsAuth => "[q]uit",
            OnboardingPhase::Unknown | OnboardingPhase::NeedsCategories => "[q]uit",
            OnboardingPhase::Ready => match app.input_mode {
                InputMode::Search => "Type to search | ENTER search | ESC cancel",
                InputMode::Browse if app.is_searching() => {
                    "[Enter]summary [o]pen [/]search [c]lear search [s]ettings [L]ogout [q]uit"
                }
                InputMode::Browse => {
                    "[Enter]summary [o]pen [/]search [r]efresh [s]ettings [L]ogout [q]uit"
                }
            },
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
