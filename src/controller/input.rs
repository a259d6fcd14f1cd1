//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, Screen};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let model = &self.model;

        // Any key dismisses a notice; Esc/Enter do nothing else
        if model.has_notice().await {
            model.clear_notice().await;
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                return Ok(());
            }
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        // Trailer modal stays open until explicitly closed
        if model.is_trailer_open().await {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('t') | KeyCode::Char('T')
            ) {
                model.close_trailer().await;
            }
            return Ok(());
        }

        // Rental confirmation dialog
        if model.has_rental_offer().await {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.confirm_rental().await;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.cancel_rental().await;
                }
                _ => {}
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Down => {
                    model.set_active_section(ActiveSection::MovieList).await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = ui_state.search_query.clone();
                    model.set_active_section(ActiveSection::MovieList).await;
                    if model.get_ui_state().await.screen == Screen::Rented {
                        model.toggle_screen().await;
                    }
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.perform_search(&query).await;
                    });
                    return Ok(());
                }
                KeyCode::Esc => {
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.clear_search().await;
                    });
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Q still quits even in search mode when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }

        // Global keybindings (movie list focused)
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                model.cycle_section().await;
            }
            KeyCode::Char('/') | KeyCode::Char('g') | KeyCode::Char('G') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                model.move_selection_up().await;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                model.move_selection_down().await;
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                model.toggle_screen().await;
            }
            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                if ui_state.screen == Screen::Browse {
                    self.request_rental().await;
                }
            }
            KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => {
                self.return_selected().await;
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.show_trailer().await;
                });
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.load_popular().await;
                });
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}
