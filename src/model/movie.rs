//! Movie and rental records as exchanged with TMDB and the local store

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Movie identifier; TMDB uses integers but older snapshots may hold strings
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovieId {
    Number(i64),
    Text(String),
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieId::Number(n) => write!(f, "{}", n),
            MovieId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        MovieId::Number(id)
    }
}

impl From<i32> for MovieId {
    fn from(id: i32) -> Self {
        MovieId::Number(id.into())
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        MovieId::Text(id.to_string())
    }
}

/// A catalog entry from the metadata service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "posterPath", skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
}

impl MovieRecord {
    #[cfg(test)]
    pub fn new(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            poster_path: None,
            overview: None,
            release_date: None,
            vote_average: None,
        }
    }

    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", POSTER_BASE_URL, p))
    }

    /// Year part of `release_date` (`YYYY-MM-DD`), empty when unknown
    pub fn release_year(&self) -> &str {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .unwrap_or("")
    }
}

/// A rented movie; serialized as the movie's own fields plus `rented_at`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RentalRecord {
    #[serde(flatten)]
    pub movie: MovieRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rented_at: Option<DateTime<Utc>>,
}

impl RentalRecord {
    pub fn new(movie: MovieRecord) -> Self {
        Self {
            movie,
            rented_at: Some(Utc::now()),
        }
    }

    pub fn id(&self) -> &MovieId {
        &self.movie.id
    }
}

/// An entry of a movie's video list
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VideoRecord {
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub official: Option<bool>,
}

/// Watch URL for a trailer key on the given platform
pub fn trailer_url(site: &str, key: &str) -> Option<String> {
    match site {
        "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", key)),
        "Vimeo" => Some(format!("https://vimeo.com/{}", key)),
        _ => None,
    }
}
