//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Header with search box and the key hint line
//! - `content`: Movie lists and the detail card
//! - `overlays`: Modal overlays (notice, rent confirmation, trailer, help)

mod utils;
mod layout;
mod content;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, ui_state: &UiState, content: &ContentState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + rented counter
                Constraint::Min(0),    // Movie list + card
                Constraint::Length(1), // Key hints
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, content);
        content::render_main_content(frame, chunks[1], ui_state, content);
        layout::render_status_bar(frame, chunks[2], ui_state);

        if let Some(ref offer) = ui_state.rental_offer {
            overlays::render_rental_offer(frame, offer);
        }

        if ui_state.trailer.is_open() {
            overlays::render_trailer_modal(frame, &ui_state.trailer);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }

        // Notices draw last so they are never hidden behind a modal
        if ui_state.notice.is_some() {
            overlays::render_notice(frame, ui_state);
        }
    }
}
