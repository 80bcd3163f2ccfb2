use crate::{
    catalog::Catalog,
    error::{AppError, AppResult},
    models::Recommendation,
    services::posters::PosterResolver,
};
use std::sync::Arc;

/// Number of similar titles returned per request
pub const RECOMMENDATION_COUNT: usize = 5;

/// Recommends similar movies from the precomputed similarity matrix
///
/// Posters are resolved one recommendation at a time, in rank order, before
/// the result is returned.
pub struct RecommendationService {
    catalog: Arc<Catalog>,
    resolver: PosterResolver,
}

impl RecommendationService {
    pub fn new(catalog: Arc<Catalog>, resolver: PosterResolver) -> Self {
        Self { catalog, resolver }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns up to [`RECOMMENDATION_COUNT`] movies most similar to `title`
    ///
    /// Unknown titles yield `AppError::NotFound`.
    pub async fn recommend(&self, title: &str) -> AppResult<Vec<Recommendation>> {
        let row = self
            .catalog
            .find_row(title)
            .ok_or_else(|| AppError::NotFound(format!("Movie '{}' not found in database", title)))?;

        let neighbours = self.catalog.ranked_neighbours(row, RECOMMENDATION_COUNT)?;

        tracing::info!(
            title = %title,
            row,
            candidates = neighbours.len(),
            "Ranking complete, resolving posters"
        );

        let mut recommendations = Vec::with_capacity(neighbours.len());
        for (other, score) in neighbours {
            let entry = self.catalog.entry(other).ok_or_else(|| {
                AppError::Internal(format!("catalog row {} out of range", other))
            })?;

            // Duplicate titles occupy separate rows, so the queried title can
            // come back as a neighbour of its first occurrence.
            if entry.title == title {
                tracing::debug!(
                    title = %title,
                    row = other,
                    "Recommended row shares the queried title"
                );
            }

            tracing::debug!(
                title = %entry.title,
                row = other,
                score,
                external_id = ?entry.external_id,
                "Fetching poster"
            );

            let poster_url = self.resolver.resolve(&entry.title, entry.external_id).await;
            recommendations.push(Recommendation {
                title: entry.title.clone(),
                poster_url,
            });
        }

        Ok(recommendations)
    }
}
