use crate::app::{App, InputMode};
use crate::controller::FeedMode;
use crate::util::{strip_control_chars, truncate_to_width};
use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::helpers::{format_published, spinner};

/// Render the search bar and the article list.
pub fn render(f: &mut Frame, app: &App, area: Rect, spinner_frame: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_search_bar(f, app, chunks[0], spinner_frame);
    render_list(f, app, chunks[1], spinner_frame);
}

fn render_search_bar(f: &mut Frame, app: &App, area: Rect, spinner_frame: usize) {
    let editing = app.input_mode == InputMode::Search;
    let mut spans = vec![Span::raw(app.search_input.as_str())];
    if editing {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    if app.feed.is_searching() {
        spans.push(Span::raw(format!("  {} Searching...", spinner(spinner_frame))));
    }

    let border_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Search [/] "),
    );
    f.render_widget(bar, area);
}

fn render_list(f: &mut Frame, app: &App, area: Rect, spinner_frame: usize) {
    let now = Utc::now();
    let articles = app.feed.articles();

    let items: Vec<ListItem> = if articles.is_empty() {
        let msg = if app.feed.is_loading() {
            format!("{} Loading news...", spinner(spinner_frame))
        } else if let Some(error) = app.feed.error() {
            format!("{error}. Press r to retry.")
        } else {
            "No articles".to_string()
        };
        vec![ListItem::new(msg)]
    } else {
        let title_width = area.width.saturating_sub(24) as usize;
        articles
            .iter()
            .enumerate()
            .map(|(i, article)| {
                let title = strip_control_chars(&article.title);
                let title_style = if i == app.selected_article {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };

                let mut spans = vec![Span::styled(
                    truncate_to_width(&title, title_width).into_owned(),
                    title_style,
                )];
                if !article.source.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", truncate_to_width(&strip_control_chars(&article.source), 14)),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                let age = format_published(article.published.as_deref(), now);
                if !age.is_empty() {
                    spans.push(Span::styled(format!("  {age}"), Style::default().fg(Color::DarkGray)));
                }

                let mut lines = vec![Line::from(spans)];
                if !article.snippet.is_empty() {
                    let snippet = strip_control_chars(&article.snippet);
                    lines.push(Line::from(Span::styled(
                        format!("  {}", truncate_to_width(snippet.trim(), area.width.saturating_sub(6) as usize)),
                        Style::default().fg(Color::Gray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect()
    };

    let mut title = match app.feed.mode() {
        FeedMode::Default => " Your news ".to_string(),
        FeedMode::Search(query) => format!(" Results for \"{}\" ", truncate_to_width(query, 40)),
    };
    if app.feed.is_loading() && !articles.is_empty() {
        title.push_str(&format!("{} ", spinner(spinner_frame)));
    }
    if let (Some(error), false) = (app.feed.error(), articles.is_empty()) {
        title.push_str(&format!("({error}) "));
    }

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    let mut state = ListState::default();
    if !articles.is_empty() {
        state.select(Some(app.selected_article));
    }
    f.render_stateful_widget(list, area, &mut state);
}
