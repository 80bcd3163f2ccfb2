use crate::{
    catalog::SimilarityMatrix,
    error::{AppError, AppResult},
    models::CatalogEntry,
};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Raw catalog row; extra columns in the CSV are ignored
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    title: String,
    #[serde(default)]
    tmdb_id: Option<String>,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    movie_id: Option<String>,
}

/// Identifier columns in order of precedence
const ID_COLUMNS: [&str; 3] = ["tmdb_id", "external_id", "movie_id"];

impl CatalogRecord {
    fn id_cell(&self, column: &str) -> Option<&str> {
        match column {
            "tmdb_id" => self.tmdb_id.as_deref(),
            "external_id" => self.external_id.as_deref(),
            "movie_id" => self.movie_id.as_deref(),
            _ => None,
        }
    }
}

pub fn load_entries(path: &Path) -> AppResult<Vec<CatalogEntry>> {
    tracing::info!(path = %path.display(), "Loading movie catalog");

    let file = File::open(path).map_err(|e| {
        AppError::Catalog(format!("failed to open catalog {}: {}", path.display(), e))
    })?;
    parse_entries(file)
}

pub fn load_similarity(path: &Path) -> AppResult<SimilarityMatrix> {
    tracing::info!(path = %path.display(), "Loading similarity matrix");

    let file = File::open(path).map_err(|e| {
        AppError::Catalog(format!(
            "failed to open similarity matrix {}: {}",
            path.display(),
            e
        ))
    })?;
    let matrix: SimilarityMatrix = serde_json::from_reader(BufReader::new(file))?;
    Ok(matrix)
}

pub(crate) fn parse_entries<R: Read>(reader: R) -> AppResult<Vec<CatalogEntry>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    // The whole file uses one identifier column; an empty cell never falls
    // back to another column.
    let id_column = ID_COLUMNS
        .iter()
        .copied()
        .find(|column| headers.iter().any(|header| header == *column));
    let mut entries = Vec::new();

    for (line, result) in reader.deserialize::<CatalogRecord>().enumerate() {
        let record = result?;
        let external_id = match id_column.and_then(|column| record.id_cell(column)) {
            Some(raw) => parse_external_id(raw).ok_or_else(|| {
                AppError::Catalog(format!(
                    "row {} ('{}') has an invalid external id: {:?}",
                    line, record.title, raw
                ))
            })?,
            None => None,
        };
        entries.push(CatalogEntry::new(record.title, external_id));
    }

    Ok(entries)
}

/// Parses an identifier cell
///
/// Returns `Some(None)` for null-like cells and `None` when the cell cannot be
/// an identifier at all. Integral floats are accepted because dataframe exports
/// write nullable integer columns as `19995.0`.
pub(crate) fn parse_external_id(raw: &str) -> Option<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty()
        || ["nan", "null", "none"]
            .iter()
            .any(|null| raw.eq_ignore_ascii_case(null))
    {
        return Some(None);
    }

    if let Ok(id) = raw.parse::<u64>() {
        return Some(Some(id));
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
            Some(Some(value as u64))
        }
        _ => None,
    }
}
