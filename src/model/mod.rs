//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `movie`: Movie, rental and video records
//! - `rentals`: Rented-movie state mirrored to the key-value store
//! - `catalog`: Catalog fetcher and the sequenced list on screen
//! - `tmdb_client`: TMDB HTTP client
//! - `types`: UI type definitions (sections, screens, modals)
//! - `content`: Per-frame snapshot of the lists
//! - `app_model`: Main application model with state management methods

mod movie;
mod rentals;
mod catalog;
mod tmdb_client;
mod types;
mod content;
mod app_model;

pub use movie::{MovieRecord, RentalRecord, trailer_url};

pub use rentals::RentedCatalog;

pub use catalog::CatalogFetcher;

pub use tmdb_client::TmdbClient;

pub use types::{ActiveSection, NoticeKind, RentalOffer, Screen, TrailerModal, UiState};

pub use content::ContentState;

pub use app_model::AppModel;

#[cfg(test)]
pub use movie::MovieId;
#[cfg(test)]
pub use rentals::RENTALS_KEY;
