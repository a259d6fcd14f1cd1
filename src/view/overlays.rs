//! Overlay rendering (notices, rent confirmation, trailer modal, help popup)

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{NoticeKind, RentalOffer, TrailerModal, UiState};
use super::utils::centered_rect;

pub fn render_notice(frame: &mut Frame, ui_state: &UiState) {
    let Some(ref notice) = ui_state.notice else {
        return;
    };
    let area = frame.area();

    let (color, title) = match notice.kind {
        NoticeKind::Error => (Color::Red, " Error (Esc to dismiss) "),
        NoticeKind::Info => (Color::Cyan, " Notice "),
    };

    let popup_width = 52;
    let inner_width = popup_width - 4;
    // Height: borders + wrapped message lines
    let line_count = (notice.message.chars().count() as u16).div_ceil(inner_width).max(1);
    let popup_area = centered_rect(area, popup_width, line_count + 2);

    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(notice.message.clone())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );
    frame.render_widget(widget, popup_area);
}

pub fn render_rental_offer(frame: &mut Frame, offer: &RentalOffer) {
    let popup_area = centered_rect(frame.area(), 50, 7);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Would you like to rent"),
        Line::from(Span::styled(
            offer.movie.title.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw("for "),
            Span::styled(offer.price_label(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("?"),
        ]),
    ];

    let dialog = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Rent Movie (y / n) ")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );
    frame.render_widget(dialog, popup_area);
}

pub fn render_trailer_modal(frame: &mut Frame, trailer: &TrailerModal) {
    let TrailerModal::Open { title, key, url } = trailer else {
        return;
    };
    let popup_area = centered_rect(frame.area(), 64, 9);
    frame.render_widget(Clear, popup_area);

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            title.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::styled("Trailer  ", label), Span::raw(key.clone())]),
    ];
    if let Some(url) = url {
        lines.push(Line::from(vec![
            Span::styled("Watch    ", label),
            Span::styled(url.clone(), Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)),
        ]));
    }

    let modal = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Trailer (Esc to close) ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(modal, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let keybindings = [
        ("", "── Navigation ──"),
        ("↑ / ↓  j / k", "Move selection"),
        ("Tab", "Switch search / list"),
        ("/  G", "Focus search"),
        ("Enter", "Search (in search box)"),
        ("Esc", "Clear search (in search box)"),
        ("V", "Toggle available / rented"),
        ("", ""),
        ("", "── Actions ──"),
        ("R / Enter", "Rent selected movie"),
        ("X / Delete", "Return rented movie"),
        ("T", "Show trailer"),
        ("P", "Reload popular movies"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_area = centered_rect(frame.area(), 56, keybindings.len() as u16 + 2);
    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^50}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>16}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help (H or Esc to close) ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(help_text, popup_area);
}
