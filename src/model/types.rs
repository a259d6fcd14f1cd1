//! Core type definitions for the application

use std::time::Instant;

use super::movie::MovieRecord;

/// Which part of the UI has keyboard focus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    MovieList,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MovieList,
            ActiveSection::MovieList => ActiveSection::Search,
        }
    }
}

/// Which list the main area shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Browse,
    Rented,
}

impl Screen {
    pub fn toggle(self) -> Self {
        match self {
            Screen::Browse => Screen::Rented,
            Screen::Rented => Screen::Browse,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Browse => " Available Movies ",
            Screen::Rented => " Rented Movies ",
        }
    }
}

/// Pending rental waiting for the user to confirm
#[derive(Clone, Debug, PartialEq)]
pub struct RentalOffer {
    pub movie: MovieRecord,
    /// Cosmetic price in cents, nothing is charged
    pub price_cents: u32,
}

impl RentalOffer {
    pub fn price_label(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// Trailer modal: either closed or open on a specific trailer key
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TrailerModal {
    #[default]
    Closed,
    Open {
        title: String,
        key: String,
        url: Option<String>,
    },
}

impl TrailerModal {
    pub fn is_open(&self) -> bool {
        matches!(self, TrailerModal::Open { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub created: Instant,
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub screen: Screen,
    pub search_query: String,
    pub browse_selected: usize,
    pub rented_selected: usize,
    pub notice: Option<Notice>,
    pub rental_offer: Option<RentalOffer>,
    pub trailer: TrailerModal,
    /// Sequence number of the most recent trailer lookup
    pub trailer_request: u64,
    pub show_help_popup: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::MovieList,
            screen: Screen::Browse,
            search_query: String::new(),
            browse_selected: 0,
            rented_selected: 0,
            notice: None,
            rental_offer: None,
            trailer: TrailerModal::Closed,
            trailer_request: 0,
            show_help_popup: false,
        }
    }
}

impl UiState {
    pub fn selected_index(&self) -> usize {
        match self.screen {
            Screen::Browse => self.browse_selected,
            Screen::Rented => self.rented_selected,
        }
    }

    pub fn selected_index_mut(&mut self) -> &mut usize {
        match self.screen {
            Screen::Browse => &mut self.browse_selected,
            Screen::Rented => &mut self.rented_selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_label() {
        let offer = RentalOffer {
            movie: MovieRecord::new(1, "A"),
            price_cents: 305,
        };
        assert_eq!(offer.price_label(), "$3.05");
    }

    #[test]
    fn test_screen_toggle_round_trips() {
        assert_eq!(Screen::Browse.toggle(), Screen::Rented);
        assert_eq!(Screen::Browse.toggle().toggle(), Screen::Browse);
    }
}
