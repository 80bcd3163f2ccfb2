use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::AppResult;
use crate::services::providers::{MetadataProvider, TmdbProvider};
use crate::services::{PosterResolver, PosterSettings, RecommendationService};

/// Shared application state
///
/// Everything behind it is read-only once built, so handlers share it without
/// locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(recommender: RecommendationService) -> Self {
        Self {
            recommender: Arc::new(recommender),
        }
    }

    /// Loads the catalog artifacts and wires the TMDB-backed services
    ///
    /// Fails if either artifact is missing or inconsistent.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let catalog = Arc::new(Catalog::load(&config.catalog_path, &config.similarity_path)?);

        let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.request_timeout(),
        )?);

        tracing::info!(
            provider = provider.name(),
            api_url = %config.tmdb_api_url,
            timeout_secs = config.request_timeout_secs,
            "Metadata provider configured"
        );

        let resolver = PosterResolver::new(provider, PosterSettings::from_config(config));
        Ok(Self::new(RecommendationService::new(catalog, resolver)))
    }

    pub fn catalog(&self) -> &Catalog {
        self.recommender.catalog()
    }
}
