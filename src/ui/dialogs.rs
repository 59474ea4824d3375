//! Summary and settings overlays.

use crate::app::{App, SettingsDialog, SettingsSection, SummaryDialog};
use crate::controller::{SummaryEntry, SUMMARY_FAILED_MESSAGE};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::categories::render_picker;
use super::helpers::{centered_rect, spinner};

pub(super) fn render_summary(f: &mut Frame, app: &App, dialog: &SummaryDialog, spinner_frame: usize) {
    let area = centered_rect(f.area(), 80, 20);
    if area.width < 10 || area.height < 5 {
        return;
    }
    f.render_widget(Clear, area);

    let (body, hint): (Vec<Line>, &str) = match app.summaries.get(&dialog.link) {
        Some(SummaryEntry::Ready(text)) => (
            strip_control_chars(text)
                .lines()
                .map(|l| Line::from(l.to_string()))
                .collect(),
            "[j/k] scroll  [o] open article  [Esc] close",
        ),
        Some(SummaryEntry::Failed(_)) => (
            vec![Line::from(Span::styled(
                SUMMARY_FAILED_MESSAGE,
                Style::default().fg(Color::Red),
            ))],
            "[r] retry  [o] open article  [Esc] close",
        ),
        Some(SummaryEntry::Pending { .. }) | None => (
            vec![Line::from(format!(
                "{} Generating summary...",
                spinner(spinner_frame)
            ))],
            "[o] open article  [Esc] close",
        ),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area.inner(Margin::new(1, 1)));

    let title = format!(
        " {} ",
        truncate_to_width(&strip_control_chars(&dialog.title), area.width.saturating_sub(6) as usize)
    );
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
        area,
    );
    f.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: true })
            .scroll((dialog.scroll, 0)),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        chunks[1],
    );
}

pub(super) fn render_settings(f: &mut Frame, app: &App, dialog: &SettingsDialog) {
    let area = centered_rect(f.area(), 76, 20);
    if area.width < 20 || area.height < 12 {
        return;
    }
    f.render_widget(Clear, area);
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Settings "),
        area,
    );

    let inner = area.inner(Margin::new(1, 1));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)])
        .split(rows[0]);

    render_picker(
        f,
        &dialog.picker,
        columns[0],
        dialog.section == SettingsSection::Categories,
    );
    render_feeds(f, app, dialog, columns[1]);

    let message = if dialog.picker.saving || dialog.feed_busy {
        Line::from("Saving...")
    } else if let Some(error) = dialog.picker.error.as_ref().or(dialog.feed_error.as_ref()) {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(message), rows[1]);

    let hint = match dialog.section {
        SettingsSection::Categories => "[Space] toggle  [Enter] save  [Tab] feeds  [Esc] close",
        SettingsSection::Feeds => "[Enter] add  [Ctrl+d] remove selected  [Up/Down] select  [Tab] categories  [Esc] close",
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        rows[2],
    );
}

fn render_feeds(f: &mut Frame, app: &App, dialog: &SettingsDialog, area: Rect) {
    let focused = dialog.section == SettingsSection::Feeds;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let feeds = app.preferences.custom_feeds();
    let items: Vec<ListItem> = if feeds.is_empty() {
        let msg = if app.preferences.is_loading() {
            "Loading..."
        } else {
            "No custom feeds"
        };
        vec![ListItem::new(msg)]
    } else {
        let width = chunks[0].width.saturating_sub(4) as usize;
        feeds
            .iter()
            .map(|url| ListItem::new(truncate_to_width(url, width).into_owned()))
            .collect()
    };

    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Custom RSS feeds "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    let mut state = ListState::default();
    if focused && !feeds.is_empty() {
        state.select(Some(dialog.feed_cursor.min(feeds.len() - 1)));
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    let cursor = if focused { "_" } else { "" };
    let input = Paragraph::new(format!("{}{cursor}", dialog.feed_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Add feed URL "),
    );
    f.render_widget(input, chunks[1]);
}
