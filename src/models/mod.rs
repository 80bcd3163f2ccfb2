use serde::{Deserialize, Serialize};

/// One row of the pre-built catalog
///
/// The row position inside the catalog is the entry's identity; titles are
/// not guaranteed to be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    /// TMDB movie ID, when the catalog carries one
    pub external_id: Option<u64>,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>, external_id: Option<u64>) -> Self {
        Self {
            title: title.into(),
            external_id,
        }
    }
}

/// A recommended title with its resolved poster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub poster_url: String,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response of `GET /movie/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// One result of `GET /search/movie`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TmdbSearchResult {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbSearchResult {
    /// Poster path if TMDB returned a usable one
    pub fn poster(&self) -> Option<&str> {
        non_empty(self.poster_path.as_deref())
    }
}

impl TmdbMovieDetails {
    pub fn poster(&self) -> Option<&str> {
        non_empty(self.poster_path.as_deref())
    }
}

fn non_empty(path: Option<&str>) -> Option<&str> {
    path.filter(|p| !p.trim().is_empty())
}

/// Envelope of `GET /search/movie`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}
