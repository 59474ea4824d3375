use crate::api::Category;
use crate::app::{App, CategoryPicker};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::helpers::centered_rect;

/// Checkbox list over the category vocabulary.
pub(super) fn render_picker(f: &mut Frame, picker: &CategoryPicker, area: Rect, focused: bool) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let items: Vec<ListItem> = Category::ALL
        .iter()
        .map(|category| {
            let mark = if picker.selected.contains(category) {
                "[x] "
            } else {
                "[ ] "
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(Color::Green)),
                Span::raw(category.label()),
            ]))
        })
        .collect();

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
                .title(" Categories "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    if focused {
        state.select(Some(picker.cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// Onboarding screen: pick at least one category to continue.
pub fn render_onboarding(f: &mut Frame, app: &App, area: Rect) {
    let picker = &app.category_picker;
    let height = Category::ALL.len() as u16 + 8;
    let outer = centered_rect(area, 50, height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(Category::ALL.len() as u16 + 2),
            Constraint::Min(1),
        ])
        .split(outer);

    f.render_widget(
        Paragraph::new("What would you like to read about?").style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[0],
    );
    render_picker(f, picker, chunks[1], true);

    let footer = if picker.saving {
        Line::from("Saving...")
    } else if let Some(error) = &picker.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::from(Span::styled(
            "[Space] toggle  [Enter] continue  [L] sign out",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(footer), chunks[2]);
}
