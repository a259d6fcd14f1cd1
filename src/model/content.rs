//! Snapshot of the list data the main content area renders

use super::movie::{MovieRecord, RentalRecord};
use super::types::Screen;

/// Lists for both screens, taken at the start of a frame
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    /// Catalog entries that are not rented
    pub available: Vec<MovieRecord>,
    /// Rentals in rental order
    pub rented: Vec<RentalRecord>,
    /// A catalog request is in flight
    pub is_loading: bool,
}

impl ContentState {
    pub fn len_for(&self, screen: Screen) -> usize {
        match screen {
            Screen::Browse => self.available.len(),
            Screen::Rented => self.rented.len(),
        }
    }

    pub fn movie_at(&self, screen: Screen, index: usize) -> Option<&MovieRecord> {
        match screen {
            Screen::Browse => self.available.get(index),
            Screen::Rented => self.rented.get(index).map(|r| &r.movie),
        }
    }
}
