//! Layout rendering (header with search box, status line)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, ContentState, Screen, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, content: &ContentState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(22), // Rented counter / screen switch
        ])
        .split(area);

    let search_focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if search_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() && !search_focused {
        "Press / to search movies...".to_string()
    } else if search_focused {
        format!("{}_", ui_state.search_query)
    } else {
        ui_state.search_query.clone()
    };

    let title = if content.is_loading {
        " Search (Loading...) "
    } else {
        " Search "
    };

    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1))
            .border_style(if search_focused {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(search, chunks[0]);

    let rented_style = if ui_state.screen == Screen::Rented {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let rented = Paragraph::new(format!("🎬 Rented: {}", content.rented.len()))
        .style(rented_style)
        .block(Block::default().borders(Borders::ALL).title(" v: switch "));
    frame.render_widget(rented, chunks[1]);
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let hints: &[(&str, &str)] = match ui_state.screen {
        Screen::Browse => &[("r", "rent"), ("t", "trailer"), ("/", "search"), ("v", "rented"), ("h", "help"), ("q", "quit")],
        Screen::Rented => &[("x", "return"), ("t", "trailer"), ("v", "browse"), ("h", "help"), ("q", "quit")],
    };

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(
                    format!(" {} ", key),
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                ),
                Span::styled(format!(" {}  ", desc), Style::default().fg(Color::Gray)),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
