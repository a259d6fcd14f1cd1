//! Remote catalog access and the list currently shown on the browse screen

use std::sync::Arc;

use async_trait::async_trait;

use super::movie::{MovieId, MovieRecord, VideoRecord};
use super::rentals::RentedCatalog;
use crate::error::FetchError;

/// Queries shorter than this keep the current list and hit no endpoint
pub const MIN_QUERY_LEN: usize = 2;

/// Remote movie metadata service
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn popular(&self) -> Result<Vec<MovieRecord>, FetchError>;

    async fn search(&self, query: &str) -> Result<Vec<MovieRecord>, FetchError>;

    async fn videos(&self, movie_id: &MovieId) -> Result<Vec<VideoRecord>, FetchError>;
}

/// Catalog queries on top of a `MovieSource`; holds no state between calls
#[derive(Clone)]
pub struct CatalogFetcher {
    source: Arc<dyn MovieSource>,
    trailer_site: String,
}

impl CatalogFetcher {
    pub fn new(source: Arc<dyn MovieSource>, trailer_site: impl Into<String>) -> Self {
        Self {
            source,
            trailer_site: trailer_site.into(),
        }
    }

    pub fn trailer_site(&self) -> &str {
        &self.trailer_site
    }

    /// Whether `query` is long enough to be sent to the service
    ///
    /// The raw length counts, whitespace included; the query is sent as typed.
    pub fn is_searchable(&self, query: &str) -> bool {
        query.chars().count() >= MIN_QUERY_LEN
    }

    pub async fn fetch_popular(&self) -> Result<Vec<MovieRecord>, FetchError> {
        let movies = self.source.popular().await?;
        tracing::debug!(count = movies.len(), "Fetched popular movies");
        Ok(movies)
    }

    /// Search the catalog
    ///
    /// Returns `Ok(None)` without any request when the query is too short;
    /// the caller keeps its current list in that case.
    pub async fn search(&self, query: &str) -> Result<Option<Vec<MovieRecord>>, FetchError> {
        if !self.is_searchable(query) {
            tracing::debug!(query, "Query too short, keeping current list");
            return Ok(None);
        }
        let movies = self.source.search(query).await?;
        tracing::debug!(query, count = movies.len(), "Search returned");
        Ok(Some(movies))
    }

    /// Key of the first video hosted on the configured trailer platform
    pub async fn fetch_trailer_key(&self, movie_id: &MovieId) -> Result<Option<String>, FetchError> {
        let videos = self.source.videos(movie_id).await?;
        let key = videos
            .into_iter()
            .find(|video| video.site == self.trailer_site && !video.key.is_empty())
            .map(|video| video.key);
        if key.is_none() {
            tracing::info!(movie_id = %movie_id, site = %self.trailer_site, "No trailer available");
        }
        Ok(key)
    }
}

/// The remote list on screen plus request sequencing
///
/// Every fetch takes a sequence number from `issue`; only the response for
/// the latest issued number is applied, so a slow stale response can never
/// overwrite a newer list.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    movies: Vec<MovieRecord>,
    latest_issued: u64,
    applied: u64,
}

impl Catalog {
    #[cfg(test)]
    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn issue(&mut self) -> u64 {
        self.latest_issued += 1;
        self.latest_issued
    }

    /// A request is outstanding while the latest issued one has not resolved
    pub fn is_pending(&self) -> bool {
        self.applied < self.latest_issued
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest_issued
    }

    /// Apply the response for request `seq`; returns false if it was stale
    pub fn resolve(&mut self, seq: u64, movies: Vec<MovieRecord>) -> bool {
        if !self.is_latest(seq) {
            tracing::debug!(seq, latest = self.latest_issued, "Discarding stale catalog response");
            return false;
        }
        self.movies = movies;
        self.applied = seq;
        true
    }

    /// Mark request `seq` as finished without changing the list
    pub fn settle(&mut self, seq: u64) -> bool {
        if !self.is_latest(seq) {
            return false;
        }
        self.applied = seq;
        true
    }

    /// Catalog entries that are not rented
    pub fn available(&self, rentals: &RentedCatalog) -> Vec<MovieRecord> {
        self.movies
            .iter()
            .filter(|movie| !rentals.is_rented(&movie.id))
            .cloned()
            .collect()
    }
}
