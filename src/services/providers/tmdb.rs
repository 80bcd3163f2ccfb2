//! TMDB (The Movie Database) API provider
//!
//! Endpoints used:
//! 1. Details: /movie/{id} → poster_path for a known TMDB ID
//! 2. Search: /search/movie?query= → candidate movies with poster paths
use crate::{
    error::{AppError, AppResult},
    models::{TmdbMovieDetails, TmdbSearchResponse, TmdbSearchResult},
    services::providers::MetadataProvider,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client as HttpClient, Response,
};
use std::time::Duration;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const DETAILS_LANGUAGE: &str = "en-US";

/// Errors are stripped of their request URL since it carries the API key.
#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Creates a provider whose every request is bounded by `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn details_url(&self, id: u64) -> String {
        format!("{}/movie/{}", self.api_url, id)
    }

    fn search_url(&self) -> String {
        format!("{}/search/movie", self.api_url)
    }

    async fn ensure_success(response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalApi(format!(
            "TMDB API returned status {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn movie_details(&self, id: u64) -> AppResult<TmdbMovieDetails> {
        let response = self
            .http_client
            .get(self.details_url(id))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", DETAILS_LANGUAGE),
            ])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let details: TmdbMovieDetails = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        tracing::debug!(
            tmdb_id = id,
            has_poster = details.poster().is_some(),
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details)
    }

    async fn search_movies(&self, query: &str) -> AppResult<Vec<TmdbSearchResult>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let response = self
            .http_client
            .get(self.search_url())
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("include_adult", "false"),
            ])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let search: TmdbSearchResponse = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        tracing::debug!(
            query = %query,
            results = search.results.len(),
            provider = "tmdb",
            "Movie search completed"
        );

        Ok(search.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
