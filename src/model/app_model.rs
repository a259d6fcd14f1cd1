//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::catalog::{Catalog, CatalogFetcher};
use super::content::ContentState;
use super::movie::{MovieRecord, RentalRecord};
use super::rentals::{RentalsMirror, RentedCatalog, Subscription};
use super::types::{ActiveSection, Notice, NoticeKind, RentalOffer, Screen, TrailerModal, UiState};

const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Main application model containing all state
///
/// Rentals are only changed through the `RentedCatalog` handle; the model keeps
/// a subscriber-fed copy of the list for the rented screen.
pub struct AppModel {
    rentals: RentedCatalog,
    fetcher: CatalogFetcher,
    catalog: Arc<Mutex<Catalog>>,
    rented_view: RentalsMirror,
    _rentals_subscription: Subscription,
    ui_state: Arc<Mutex<UiState>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(rentals: RentedCatalog, fetcher: CatalogFetcher) -> Self {
        let (rented_view, subscription) = RentalsMirror::attach(&rentals);

        Self {
            rentals,
            fetcher,
            catalog: Arc::new(Mutex::new(Catalog::default())),
            rented_view,
            _rentals_subscription: subscription,
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn rentals(&self) -> &RentedCatalog {
        &self.rentals
    }

    pub fn fetcher(&self) -> &CatalogFetcher {
        &self.fetcher
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Take a sequence number for a new catalog request
    pub async fn begin_catalog_request(&self) -> u64 {
        self.catalog.lock().await.issue()
    }

    /// Apply a catalog response; stale responses are dropped
    pub async fn apply_catalog(&self, seq: u64, movies: Vec<MovieRecord>) -> bool {
        let applied = self.catalog.lock().await.resolve(seq, movies);
        if applied {
            self.ui_state.lock().await.browse_selected = 0;
        }
        applied
    }

    /// Finish a catalog request that produced no new list
    pub async fn settle_catalog(&self, seq: u64) -> bool {
        self.catalog.lock().await.settle(seq)
    }

    pub async fn is_catalog_loading(&self) -> bool {
        self.catalog.lock().await.is_pending()
    }

    pub async fn available_movies(&self) -> Vec<MovieRecord> {
        self.catalog.lock().await.available(&self.rentals)
    }

    pub fn rented_movies(&self) -> Vec<RentalRecord> {
        self.rented_view.records()
    }

    pub async fn get_content_state(&self) -> ContentState {
        let (available, is_loading) = {
            let catalog = self.catalog.lock().await;
            (catalog.available(&self.rentals), catalog.is_pending())
        };
        let content = ContentState {
            available,
            rented: self.rented_movies(),
            is_loading,
        };

        let mut state = self.ui_state.lock().await;
        state.browse_selected = clamp_index(state.browse_selected, content.available.len());
        state.rented_selected = clamp_index(state.rented_selected, content.rented.len());
        content
    }

    /// Movie under the cursor on the current screen
    pub async fn get_selected_movie(&self) -> Option<MovieRecord> {
        let (screen, index) = {
            let state = self.ui_state.lock().await;
            (state.screen, state.selected_index())
        };
        match screen {
            Screen::Browse => self.available_movies().await.get(index).cloned(),
            Screen::Rented => self.rented_movies().get(index).map(|r| r.movie.clone()),
        }
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn toggle_screen(&self) {
        let mut state = self.ui_state.lock().await;
        state.screen = state.screen.toggle();
        state.active_section = ActiveSection::MovieList;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        let selected = state.selected_index_mut();
        *selected = selected.saturating_sub(1);
    }

    pub async fn move_selection_down(&self) {
        let screen = self.ui_state.lock().await.screen;
        let len = match screen {
            Screen::Browse => self.available_movies().await.len(),
            Screen::Rented => self.rented_movies().len(),
        };
        let mut state = self.ui_state.lock().await;
        let selected = state.selected_index_mut();
        if *selected + 1 < len {
            *selected += 1;
        }
    }

    pub async fn search_query(&self) -> String {
        self.ui_state.lock().await.search_query.clone()
    }

    pub async fn update_search_query(&self, query: String) {
        self.ui_state.lock().await.search_query = query;
    }

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_query.pop();
    }

    // ========================================================================
    // Notices
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        self.set_notice(NoticeKind::Error, message).await;
    }

    pub async fn set_info(&self, message: String) {
        self.set_notice(NoticeKind::Info, message).await;
    }

    async fn set_notice(&self, kind: NoticeKind, message: String) {
        self.ui_state.lock().await.notice = Some(Notice {
            kind,
            message,
            created: Instant::now(),
        });
    }

    pub async fn clear_notice(&self) {
        self.ui_state.lock().await.notice = None;
    }

    pub async fn has_notice(&self) -> bool {
        self.ui_state.lock().await.notice.is_some()
    }

    pub async fn auto_clear_old_notices(&self) {
        let mut state = self.ui_state.lock().await;
        if state
            .notice
            .as_ref()
            .is_some_and(|notice| notice.created.elapsed() > NOTICE_TTL)
        {
            state.notice = None;
        }
    }

    // ========================================================================
    // Rental confirmation
    // ========================================================================

    pub async fn offer_rental(&self, movie: MovieRecord, price_cents: u32) {
        self.ui_state.lock().await.rental_offer = Some(RentalOffer { movie, price_cents });
    }

    pub async fn has_rental_offer(&self) -> bool {
        self.ui_state.lock().await.rental_offer.is_some()
    }

    pub async fn take_rental_offer(&self) -> Option<RentalOffer> {
        self.ui_state.lock().await.rental_offer.take()
    }

    // ========================================================================
    // Trailer modal and help
    // ========================================================================

    /// Take a sequence number for a trailer lookup, superseding earlier ones
    pub async fn begin_trailer_request(&self) -> u64 {
        let mut state = self.ui_state.lock().await;
        state.trailer_request += 1;
        state.trailer_request
    }

    pub async fn is_latest_trailer_request(&self, seq: u64) -> bool {
        self.ui_state.lock().await.trailer_request == seq
    }

    /// Open the modal for lookup `seq`; returns false if a newer lookup started
    pub async fn open_trailer(&self, seq: u64, title: String, key: String, url: Option<String>) -> bool {
        let mut state = self.ui_state.lock().await;
        if state.trailer_request != seq {
            return false;
        }
        state.trailer = TrailerModal::Open { title, key, url };
        true
    }

    pub async fn close_trailer(&self) {
        self.ui_state.lock().await.trailer = TrailerModal::Closed;
    }

    pub async fn is_trailer_open(&self) -> bool {
        self.ui_state.lock().await.trailer.is_open()
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::model::catalog::testing::FakeSource;
    use crate::storage::MemoryStore;

    pub struct Harness {
        pub model: Arc<AppModel>,
        pub source: Arc<FakeSource>,
        pub store: Arc<MemoryStore>,
    }

    pub async fn harness() -> Harness {
        let source = Arc::new(FakeSource::default());
        let store = Arc::new(MemoryStore::new());
        let rentals = RentedCatalog::hydrate(store.clone()).await;
        let fetcher = CatalogFetcher::new(source.clone(), "YouTube");
        Harness {
            model: Arc::new(AppModel::new(rentals, fetcher)),
            source,
            store,
        }
    }
}
