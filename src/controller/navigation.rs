//! Catalog loading, search and trailer lookups

use crate::error::FetchError;
use crate::model::{MovieRecord, trailer_url};
use super::AppController;

impl AppController {
    /// Replace the list with the popular movies
    pub async fn load_popular(&self) {
        let seq = self.model.begin_catalog_request().await;
        tracing::debug!(seq, "Loading popular movies");

        let result = self.model.fetcher().fetch_popular().await;
        self.finish_catalog_request(seq, "popular", result.map(Some)).await;
    }

    /// Replace the list with search results; short queries change nothing
    pub async fn perform_search(&self, query: &str) {
        if !self.model.fetcher().is_searchable(query) {
            tracing::debug!(query, "Ignoring search, query too short");
            return;
        }
        let seq = self.model.begin_catalog_request().await;
        tracing::debug!(seq, query, "Performing search");

        let result = self.model.fetcher().search(query).await;
        self.finish_catalog_request(seq, "search", result).await;
    }

    /// Empty the search box and go back to the popular list
    pub async fn clear_search(&self) {
        self.model.update_search_query(String::new()).await;
        self.load_popular().await;
    }

    async fn finish_catalog_request(
        &self,
        seq: u64,
        operation: &'static str,
        result: Result<Option<Vec<MovieRecord>>, FetchError>,
    ) {
        match result {
            Ok(Some(movies)) => {
                let count = movies.len();
                if self.model.apply_catalog(seq, movies).await {
                    tracing::info!(operation, seq, count, "Catalog updated");
                }
            }
            Ok(None) => {
                self.model.settle_catalog(seq).await;
            }
            Err(e) => {
                tracing::error!(operation, seq, error = %e, "Catalog request failed");
                // Older list stays on screen
                if self.model.settle_catalog(seq).await {
                    self.model.set_error(Self::format_error(&e)).await;
                }
            }
        }
    }

    /// Look up the trailer of the selected movie and open the modal
    ///
    /// A lookup started later supersedes this one; its result is then dropped.
    pub async fn show_trailer(&self) {
        let Some(movie) = self.model.get_selected_movie().await else {
            return;
        };
        let seq = self.model.begin_trailer_request().await;
        tracing::debug!(seq, movie_id = %movie.id, "Looking up trailer");

        let result = self.model.fetcher().fetch_trailer_key(&movie.id).await;
        self.finish_trailer_request(seq, movie, result).await;
    }

    async fn finish_trailer_request(
        &self,
        seq: u64,
        movie: MovieRecord,
        result: Result<Option<String>, FetchError>,
    ) {
        if !self.model.is_latest_trailer_request(seq).await {
            tracing::debug!(seq, movie_id = %movie.id, "Discarding superseded trailer lookup");
            return;
        }

        match result {
            Ok(Some(key)) => {
                let url = trailer_url(self.model.fetcher().trailer_site(), &key);
                if self.model.open_trailer(seq, movie.title, key.clone(), url).await {
                    tracing::info!(movie_id = %movie.id, key = %key, "Opening trailer");
                }
            }
            Ok(None) => {
                self.model.set_info("No trailer available.".to_string()).await;
            }
            Err(e) => {
                tracing::error!(movie_id = %movie.id, error = %e, "Trailer lookup failed");
                self.model.set_error(Self::format_error(&e)).await;
            }
        }
    }
}
