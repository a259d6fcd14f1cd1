//! Runtime configuration read from environment variables
//!
//! The TMDB access token is never compiled in; it must be provided through
//! `CINERENT_TMDB_TOKEN`.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const TOKEN_ENV_VAR: &str = "CINERENT_TMDB_TOKEN";
pub const API_BASE_ENV_VAR: &str = "CINERENT_API_BASE";
pub const DATA_DIR_ENV_VAR: &str = "CINERENT_DATA_DIR";
pub const TRAILER_SITE_ENV_VAR: &str = "CINERENT_TRAILER_SITE";
pub const HTTP_TIMEOUT_ENV_VAR: &str = "CINERENT_HTTP_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_DATA_DIR: &str = ".cache";
pub const DEFAULT_TRAILER_SITE: &str = "YouTube";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_token: String,
    pub api_base: String,
    pub data_dir: PathBuf,
    pub trailer_site: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| {
            std::env::var_os(name).and_then(|val| val.into_string().ok())
        })
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_token = non_empty(TOKEN_ENV_VAR).ok_or(ConfigError::Missing(TOKEN_ENV_VAR))?;

        let api_base = non_empty(API_BASE_ENV_VAR)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let data_dir = non_empty(DATA_DIR_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let trailer_site =
            non_empty(TRAILER_SITE_ENV_VAR).unwrap_or_else(|| DEFAULT_TRAILER_SITE.to_string());

        let http_timeout = match non_empty(HTTP_TIMEOUT_ENV_VAR) {
            Some(value) => {
                let secs = value.trim().parse::<u64>().ok().filter(|s| *s > 0).ok_or(
                    ConfigError::Invalid {
                        name: HTTP_TIMEOUT_ENV_VAR,
                        value: value.clone(),
                    },
                )?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            api_token: api_token.trim().to_string(),
            api_base,
            data_dir,
            trailer_site,
            http_timeout,
        })
    }
}
