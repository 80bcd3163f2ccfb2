//! In-memory movie catalog and its precomputed similarity matrix
//!
//! Both halves are loaded together at startup and never mutated afterwards, so
//! a `Catalog` can be shared across request handlers behind an `Arc` without
//! any locking.
use crate::{
    error::{AppError, AppResult},
    models::CatalogEntry,
};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

pub mod loader;

/// Square matrix of pairwise similarity scores, indexed by catalog row
pub type SimilarityMatrix = Vec<Vec<f64>>;

#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    similarity: SimilarityMatrix,
}

impl Catalog {
    /// Builds a catalog, checking that the matrix is square and matches the entry count
    pub fn new(entries: Vec<CatalogEntry>, similarity: SimilarityMatrix) -> AppResult<Self> {
        if entries.is_empty() {
            return Err(AppError::Catalog("catalog contains no movies".to_string()));
        }

        if similarity.len() != entries.len() {
            return Err(AppError::Catalog(format!(
                "similarity matrix has {} rows but catalog has {} movies",
                similarity.len(),
                entries.len()
            )));
        }

        if let Some((row, scores)) = similarity
            .iter()
            .enumerate()
            .find(|(_, scores)| scores.len() != entries.len())
        {
            return Err(AppError::Catalog(format!(
                "similarity row {} has {} columns, expected {}",
                row,
                scores.len(),
                entries.len()
            )));
        }

        let mut seen = HashSet::new();
        let duplicates = entries
            .iter()
            .filter(|entry| !seen.insert(entry.title.as_str()))
            .count();
        if duplicates > 0 {
            // Lookups resolve to the first row carrying a title.
            tracing::debug!(duplicates, "Catalog contains duplicate titles");
        }

        Ok(Self {
            entries,
            similarity,
        })
    }

    /// Loads the catalog CSV and similarity JSON from disk
    pub fn load(catalog_path: impl AsRef<Path>, similarity_path: impl AsRef<Path>) -> AppResult<Self> {
        let entries = loader::load_entries(catalog_path.as_ref())?;
        let similarity = loader::load_similarity(similarity_path.as_ref())?;

        let catalog = Self::new(entries, similarity)?;

        tracing::info!(
            movies = catalog.len(),
            with_external_id = catalog
                .entries
                .iter()
                .filter(|e| e.external_id.is_some())
                .count(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row of the first entry whose title matches exactly (case-sensitive)
    pub fn find_row(&self, title: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.title == title)
    }

    pub fn entry(&self, row: usize) -> Option<&CatalogEntry> {
        self.entries.get(row)
    }

    pub fn external_id_for(&self, row: usize) -> Option<u64> {
        self.entries.get(row).and_then(|entry| entry.external_id)
    }

    /// All titles in catalog order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.title.as_str())
    }

    /// Other rows ranked by descending similarity to `row`
    ///
    /// The row itself is removed by index, not by rank position, since nothing
    /// guarantees the diagonal holds the maximum score.
    pub fn ranked_neighbours(&self, row: usize, limit: usize) -> AppResult<Vec<(usize, f64)>> {
        let scores = self
            .similarity
            .get(row)
            .ok_or_else(|| AppError::Internal(format!("similarity row {} out of range", row)))?;

        if scores.len() != self.entries.len() {
            return Err(AppError::Internal(format!(
                "similarity row {} has {} columns, expected {}",
                row,
                scores.len(),
                self.entries.len()
            )));
        }

        let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| descending(a.1, b.1));

        Ok(ranked
            .into_iter()
            .filter(|(other, _)| *other != row)
            .take(limit)
            .collect())
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
