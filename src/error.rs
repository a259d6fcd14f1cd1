//! Error taxonomy for the catalog, storage and rental components
//!
//! None of these are fatal to the application: the controller turns each of
//! them into a notification and keeps the previous state on screen.

use thiserror::Error;

/// Failure talking to the remote movie metadata service
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl FetchError {
    /// Short message suitable for the notification popup
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Status { status: 401, .. } => {
                "Movie service rejected the access token. Check CINERENT_TMDB_TOKEN.".to_string()
            }
            FetchError::Status { status: 429, .. } => "Rate limited. Please wait a moment.".to_string(),
            FetchError::Status { status, .. } => format!("Movie service error (HTTP {})", status),
            FetchError::Request { .. } => "Could not reach the movie service.".to_string(),
            FetchError::Decode { .. } => "Unexpected response from the movie service.".to_string(),
        }
    }
}

/// Raw failure of the key-value store itself
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// The persisted rentals snapshot exists but cannot be decoded
#[derive(Debug, Error)]
#[error("stored snapshot under {key} is corrupted: {message}")]
pub struct StorageCorruptionError {
    pub key: String,
    pub message: String,
}

/// Hydration failure, before it is recovered to an empty rental list
#[derive(Debug, Error)]
pub enum HydrateError {
    #[error(transparent)]
    Corrupted(#[from] StorageCorruptionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Writing the rentals snapshot failed
///
/// Cloneable so the last outcome can be shared through a watch channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("failed to encode rentals snapshot: {0}")]
    Encode(String),
    #[error("failed to write rentals snapshot: {0}")]
    Write(String),
    #[error("rentals writer is no longer running")]
    WriterStopped,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),
    #[error("environment variable {name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}
