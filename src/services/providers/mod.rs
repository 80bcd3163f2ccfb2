//! Movie metadata provider abstraction
//!
//! The poster resolver only needs two lookups from a metadata source: fetch
//! one movie by its provider ID and free-text search. Keeping them behind a
//! trait lets the resolver be exercised without the network.
use crate::{
    error::AppResult,
    models::{TmdbMovieDetails, TmdbSearchResult},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch a single movie by provider ID
    ///
    /// Any non-success status is returned as an error.
    async fn movie_details(&self, id: u64) -> AppResult<TmdbMovieDetails>;

    /// Search movies by title
    ///
    /// Result order is the provider's relevance order.
    async fn search_movies(&self, query: &str) -> AppResult<Vec<TmdbSearchResult>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
