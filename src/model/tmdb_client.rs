//! TMDB HTTP client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::catalog::MovieSource;
use super::movie::{MovieId, MovieRecord, VideoRecord};
use crate::config::Config;
use crate::error::FetchError;

/// `{ "results": [...] }` envelope shared by the list endpoints
#[derive(Debug, Deserialize)]
struct ResultPage<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Clone)]
pub struct TmdbClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TmdbClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("cinerent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FetchError::Request {
                endpoint: config.api_base.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: config.api_base.clone(),
            token: config.api_token.clone(),
        })
    }

    async fn get_results<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(endpoint = path, "API request started");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                endpoint: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(endpoint = path, status = status.as_u16(), "API request failed");
            return Err(FetchError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            endpoint: path.to_string(),
            source,
        })?;
        let page: ResultPage<T> = serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?;

        tracing::info!(endpoint = path, count = page.results.len(), "API request successful");
        Ok(page.results)
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn popular(&self) -> Result<Vec<MovieRecord>, FetchError> {
        self.get_results("/movie/popular", &[]).await
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieRecord>, FetchError> {
        self.get_results("/search/movie", &[("query", query)]).await
    }

    async fn videos(&self, movie_id: &MovieId) -> Result<Vec<VideoRecord>, FetchError> {
        let path = format!("/movie/{}/videos", movie_id);
        self.get_results(&path, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_page_defaults_to_empty() {
        let page: ResultPage<MovieRecord> = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_result_page_decodes_videos() {
        let json = r#"{
            "id": 550,
            "results": [
                {"iso_639_1": "en", "name": "Trailer", "key": "BdJKm16Co6M", "site": "YouTube", "type": "Trailer", "official": true},
                {"name": "Clip", "key": "abc", "site": "Vimeo"}
            ]
        }"#;
        let page: ResultPage<VideoRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].kind.as_deref(), Some("Trailer"));
        assert_eq!(page.results[1].official, None);
    }

    #[test]
    fn test_client_uses_configured_base() {
        let config = Config::from_lookup(|name| match name {
            crate::config::TOKEN_ENV_VAR => Some("token".to_string()),
            crate::config::API_BASE_ENV_VAR => Some("http://127.0.0.1:1/3".to_string()),
            _ => None,
        })
        .unwrap();
        let client = TmdbClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:1/3");
        assert_eq!(client.token, "token");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_request_error() {
        let config = Config::from_lookup(|name| match name {
            crate::config::TOKEN_ENV_VAR => Some("token".to_string()),
            crate::config::API_BASE_ENV_VAR => Some("http://127.0.0.1:1/3".to_string()),
            _ => None,
        })
        .unwrap();
        let client = TmdbClient::new(&config).unwrap();
        let err = client.popular().await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
