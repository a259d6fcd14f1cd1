//! Main content area rendering (movie lists and the detail card)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{ActiveSection, ContentState, MovieRecord, RentalRecord, Screen, UiState};
use super::utils::{calculate_num_width, format_rating, render_scrollable_list, truncate_string};

pub fn render_main_content(frame: &mut Frame, area: Rect, ui_state: &UiState, content: &ContentState) {
    let is_focused = ui_state.active_section == ActiveSection::MovieList;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // List
            Constraint::Percentage(40), // Movie card
        ])
        .split(area);

    let selected = ui_state.selected_index();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(ui_state.screen.title())
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    if content.len_for(ui_state.screen) == 0 {
        let message = match ui_state.screen {
            Screen::Browse if content.is_loading => "Loading...",
            Screen::Browse => "No movies to show.\n\nPress p to reload popular movies or / to search.",
            Screen::Rented => "You have not rented any movies yet.\n\nPress v to browse.",
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, chunks[0]);
    } else {
        let content_width = chunks[0].width.saturating_sub(4) as usize;
        let items = match ui_state.screen {
            Screen::Browse => browse_items(&content.available, selected, is_focused, content_width),
            Screen::Rented => rented_items(&content.rented, selected, is_focused, content_width),
        };
        render_scrollable_list(frame, chunks[0], items, selected, block);
    }

    render_movie_card(frame, chunks[1], content.movie_at(ui_state.screen, selected), content, ui_state.screen, selected);
}

fn item_style(is_selected: bool, is_focused: bool) -> Style {
    if is_selected && is_focused {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn browse_items(movies: &[MovieRecord], selected: usize, is_focused: bool, width: usize) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(movies.len());
    // " {num}  {title}  {year}  {rating}"
    let title_width = width.saturating_sub(num_width + 2 + 2 + 4 + 2 + 6);

    movies
        .iter()
        .enumerate()
        .map(|(i, movie)| {
            let text = format!(
                "{:>num_width$}  {}  {:4}  {:>6}",
                i + 1,
                truncate_string(&movie.title, title_width),
                movie.release_year(),
                format_rating(movie.vote_average),
            );
            ListItem::new(text).style(item_style(i == selected, is_focused))
        })
        .collect()
}

fn rented_items(rentals: &[RentalRecord], selected: usize, is_focused: bool, width: usize) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(rentals.len());
    // " {num}  {title}  {rented on}"
    let title_width = width.saturating_sub(num_width + 2 + 2 + 10);

    rentals
        .iter()
        .enumerate()
        .map(|(i, rental)| {
            let rented_on = rental
                .rented_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let text = format!(
                "{:>num_width$}  {}  {:10}",
                i + 1,
                truncate_string(&rental.movie.title, title_width),
                rented_on,
            );
            ListItem::new(text).style(item_style(i == selected, is_focused))
        })
        .collect()
}

fn render_movie_card(
    frame: &mut Frame,
    area: Rect,
    movie: Option<&MovieRecord>,
    content: &ContentState,
    screen: Screen,
    selected: usize,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Details ")
        .padding(Padding::horizontal(1));

    let Some(movie) = movie else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            movie.title.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if !movie.release_year().is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Year    ", label),
            Span::raw(movie.release_year().to_string()),
        ]));
    }
    let rating = format_rating(movie.vote_average);
    if !rating.is_empty() {
        lines.push(Line::from(vec![Span::styled("Rating  ", label), Span::raw(rating)]));
    }
    if screen == Screen::Rented {
        if let Some(at) = content.rented.get(selected).and_then(|r| r.rented_at) {
            lines.push(Line::from(vec![
                Span::styled("Rented  ", label),
                Span::raw(at.format("%Y-%m-%d %H:%M").to_string()),
            ]));
        }
    }
    if let Some(url) = movie.poster_url() {
        lines.push(Line::from(vec![Span::styled("Poster  ", label), Span::raw(url)]));
    }
    if let Some(overview) = movie.overview.as_deref().filter(|o| !o.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::raw(overview.to_string())));
    }

    let card = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(card, area);
}
