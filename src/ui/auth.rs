use crate::app::{App, AuthField, AuthMode};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::helpers::{centered_rect, spinner};

fn field_label(field: AuthField) -> &'static str {
    match field {
        AuthField::Email => "Email",
        AuthField::Password => "Password",
        AuthField::Name => "Name",
    }
}

/// Render the login/signup form.
pub fn render(f: &mut Frame, app: &App, area: Rect, spinner_frame: usize) {
    let form = &app.auth_form;
    let title = match form.mode {
        AuthMode::Login => " Sign in ",
        AuthMode::Signup => " Create account ",
    };

    let mut lines = vec![Line::from("")];
    for &field in form.fields() {
        let value = match field {
            AuthField::Email => form.email.clone(),
            AuthField::Name => form.name.clone(),
            AuthField::Password => "*".repeat(form.password.chars().count()),
        };
        let focused = field == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>9}: ", field_label(field)), label_style),
            Span::raw(format!("{value}{cursor}")),
        ]));
    }
    lines.push(Line::from(""));

    if form.submitting {
        lines.push(Line::from(format!("{} Please wait...", spinner(spinner_frame))));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));

    let toggle_hint = match form.mode {
        AuthMode::Login => "[Ctrl+t] create an account",
        AuthMode::Signup => "[Ctrl+t] sign in instead",
    };
    lines.push(Line::from(Span::styled(
        format!("[Enter] submit  [Tab] next field  {toggle_hint}  [Esc] quit"),
        Style::default().fg(Color::DarkGray),
    )));

    let overlay = centered_rect(area, 64, lines.len() as u16 + 2);
    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .alignment(Alignment::Left);
    f.render_widget(paragraph, overlay);
}
