//! Poster resolution fallback chain
//!
//! Strategies are tried in order and the first one that yields a poster path
//! wins:
//! 1. By identifier: `/movie/{id}` when the catalog carries a TMDB ID
//! 2. By exact title: search, preferring a case-insensitive title match
//! 3. By simplified title: search again with parentheses and punctuation removed
//! 4. Placeholder image
//!
//! Every failure along the way (non-2xx, timeout, malformed body, no poster) is
//! logged and swallowed. `resolve` always returns a usable URL.
use crate::{
    config::Config,
    error::AppResult,
    models::{TmdbMovieDetails, TmdbSearchResult},
    services::providers::MetadataProvider,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Where posters are served from and what to show when none is found
#[derive(Debug, Clone)]
pub struct PosterSettings {
    pub image_base_url: String,
    pub poster_width: String,
    pub placeholder_url: String,
    /// Upper bound for each individual metadata call
    pub call_timeout: Duration,
}

impl PosterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            image_base_url: config.tmdb_image_base_url.clone(),
            poster_width: config.poster_width.clone(),
            placeholder_url: config.placeholder_poster_url.clone(),
            call_timeout: config.request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterStrategy {
    ById,
    ExactTitle,
    SimplifiedTitle,
}

impl PosterStrategy {
    pub const CHAIN: [PosterStrategy; 3] = [
        PosterStrategy::ById,
        PosterStrategy::ExactTitle,
        PosterStrategy::SimplifiedTitle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PosterStrategy::ById => "by_id",
            PosterStrategy::ExactTitle => "exact_title",
            PosterStrategy::SimplifiedTitle => "simplified_title",
        }
    }
}

#[derive(Clone)]
pub struct PosterResolver {
    provider: Arc<dyn MetadataProvider>,
    settings: PosterSettings,
}

impl PosterResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>, settings: PosterSettings) -> Self {
        Self { provider, settings }
    }

    /// Resolves a poster URL for a movie, never failing
    pub async fn resolve(&self, title: &str, external_id: Option<u64>) -> String {
        let lookup = Lookup {
            provider: self.provider.as_ref(),
            timeout: self.settings.call_timeout,
        };

        for strategy in PosterStrategy::CHAIN {
            let poster_path = match strategy {
                PosterStrategy::ById => by_identifier(&lookup, external_id).await,
                PosterStrategy::ExactTitle => by_exact_title(&lookup, title).await,
                PosterStrategy::SimplifiedTitle => by_simplified_title(&lookup, title).await,
            };

            if let Some(path) = poster_path {
                let url = self.image_url(&path);
                tracing::info!(
                    title = %title,
                    strategy = strategy.as_str(),
                    poster_url = %url,
                    "Poster resolved"
                );
                return url;
            }
        }

        tracing::warn!(title = %title, ?external_id, "All poster strategies failed");
        self.settings.placeholder_url.clone()
    }

    fn image_url(&self, poster_path: &str) -> String {
        let base = self.settings.image_base_url.trim_end_matches('/');
        let width = self.settings.poster_width.trim_matches('/');
        if poster_path.starts_with('/') {
            format!("{}/{}{}", base, width, poster_path)
        } else {
            format!("{}/{}/{}", base, width, poster_path)
        }
    }
}

/// Metadata calls with timeouts and error swallowing applied
struct Lookup<'a> {
    provider: &'a dyn MetadataProvider,
    timeout: Duration,
}

impl Lookup<'_> {
    async fn details(&self, id: u64) -> Option<TmdbMovieDetails> {
        self.call("movie_details", self.provider.movie_details(id)).await
    }

    async fn search(&self, query: &str) -> Option<Vec<TmdbSearchResult>> {
        self.call("search_movies", self.provider.search_movies(query)).await
    }

    async fn call<T, F>(&self, operation: &'static str, request: F) -> Option<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::warn!(operation, error = %e, "Metadata request failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Metadata request timed out"
                );
                None
            }
        }
    }
}

async fn by_identifier(lookup: &Lookup<'_>, external_id: Option<u64>) -> Option<String> {
    let id = external_id?;
    tracing::debug!(tmdb_id = id, "Trying poster lookup by ID");

    let details = lookup.details(id).await?;
    let poster = details.poster().map(str::to_string);
    if poster.is_none() {
        tracing::debug!(tmdb_id = id, "Movie found by ID, but no poster available");
    }
    poster
}

async fn by_exact_title(lookup: &Lookup<'_>, title: &str) -> Option<String> {
    tracing::debug!(title = %title, "Trying poster search by exact title");

    let results = lookup.search(title).await?;
    let poster = best_match(&results, title).map(str::to_string);
    if poster.is_none() {
        tracing::debug!(title = %title, results = results.len(), "No search results with posters");
    }
    poster
}

async fn by_simplified_title(lookup: &Lookup<'_>, title: &str) -> Option<String> {
    let simplified = simplify_title(title);
    if simplified.is_empty() || simplified == title {
        return None;
    }
    tracing::debug!(title = %title, simplified = %simplified, "Trying poster search by simplified title");

    let results = lookup.search(&simplified).await?;
    first_with_poster(&results).map(str::to_string)
}

/// Poster of a case-insensitive title match, else of the first result with one
fn best_match<'a>(results: &'a [TmdbSearchResult], title: &str) -> Option<&'a str> {
    let wanted = title.to_lowercase();
    results
        .iter()
        .filter(|result| result.title.to_lowercase() == wanted)
        .find_map(TmdbSearchResult::poster)
        .or_else(|| first_with_poster(results))
}

fn first_with_poster(results: &[TmdbSearchResult]) -> Option<&str> {
    results.iter().find_map(TmdbSearchResult::poster)
}

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthesized pattern is valid"));
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern is valid"));

/// Removes parenthesised substrings, then anything that is not a word character
/// or whitespace, trimming after each pass
pub fn simplify_title(title: &str) -> String {
    let without_parens = PARENTHESIZED.replace_all(title, "");
    NON_WORD
        .replace_all(without_parens.trim(), "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockMetadataProvider;
    use mockall::predicate::eq;

    const PLACEHOLDER: &str = "https://via.placeholder.com/300x450?text=No+Image";

    fn settings() -> PosterSettings {
        PosterSettings {
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            poster_width: "w500".to_string(),
            placeholder_url: PLACEHOLDER.to_string(),
            call_timeout: Duration::from_millis(100),
        }
    }

    fn resolver(mock: MockMetadataProvider) -> PosterResolver {
        PosterResolver::new(Arc::new(mock), settings())
    }

    fn result(title: &str, poster_path: Option<&str>) -> TmdbSearchResult {
        TmdbSearchResult {
            id: 1,
            title: title.to_string(),
            poster_path: poster_path.map(str::to_string),
        }
    }

    fn api_down() -> AppError {
        AppError::ExternalApi("TMDB API returned status 503".to_string())
    }

    #[tokio::test]
    async fn test_identifier_preferred_over_search() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_movie_details()
            .with(eq(603))
            .times(1)
            .returning(|id| {
                Ok(TmdbMovieDetails {
                    id,
                    title: Some("The Matrix".to_string()),
                    poster_path: Some("/by-id.jpg".to_string()),
                })
            });
        mock.expect_search_movies().times(0);

        let url = resolver(mock).resolve("The Matrix", Some(603)).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/by-id.jpg");
    }

    #[tokio::test]
    async fn test_identifier_without_poster_falls_through_to_search() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_movie_details().times(1).returning(|id| {
            Ok(TmdbMovieDetails {
                id,
                title: None,
                poster_path: None,
            })
        });
        mock.expect_search_movies()
            .with(eq("Heat"))
            .times(1)
            .returning(|_| Ok(vec![result("Heat", Some("/heat.jpg"))]));

        let url = resolver(mock).resolve("Heat", Some(949)).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/heat.jpg");
    }

    #[tokio::test]
    async fn test_no_identifier_skips_details_call() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_movie_details().times(0);
        mock.expect_search_movies()
            .times(1)
            .returning(|_| Ok(vec![result("Heat", Some("/heat.jpg"))]));

        let url = resolver(mock).resolve("Heat", None).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/heat.jpg");
    }

    #[tokio::test]
    async fn test_exact_title_match_preferred_over_first_result() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_search_movies().times(1).returning(|_| {
            Ok(vec![
                result("Avatar: The Way of Water", Some("/sequel.jpg")),
                result("AVATAR", None),
                result("Avatar", Some("/avatar.jpg")),
            ])
        });

        let url = resolver(mock).resolve("avatar", None).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/avatar.jpg");
    }

    #[tokio::test]
    async fn test_first_result_with_poster_when_no_exact_match() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_search_movies().times(1).returning(|_| {
            Ok(vec![
                result("Alien Resurrection", None),
                result("Aliens", Some("/aliens.jpg")),
                result("Alien 3", Some("/alien3.jpg")),
            ])
        });

        let url = resolver(mock).resolve("Alien", None).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/aliens.jpg");
    }

    #[tokio::test]
    async fn test_simplified_title_tried_once_then_placeholder() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_search_movies()
            .with(eq("Some Movie (2020)!"))
            .times(1)
            .returning(|_| Err(api_down()));
        mock.expect_search_movies()
            .with(eq("Some Movie"))
            .times(1)
            .returning(|_| Err(api_down()));

        let url = resolver(mock).resolve("Some Movie (2020)!", None).await;
        assert_eq!(url, PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_simplified_title_search_succeeds() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_search_movies()
            .with(eq("Amélie (2001)"))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        mock.expect_search_movies()
            .with(eq("Amélie"))
            .times(1)
            .returning(|_| Ok(vec![result("Amélie", Some("/amelie.jpg"))]));

        let url = resolver(mock).resolve("Amélie (2001)", None).await;
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/amelie.jpg");
    }

    #[tokio::test]
    async fn test_simplification_skipped_for_plain_title() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_search_movies()
            .with(eq("Alpha"))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let url = resolver(mock).resolve("Alpha", None).await;
        assert_eq!(url, PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_all_failures_return_placeholder() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_movie_details()
            .times(1)
            .returning(|_| Err(api_down()));
        mock.expect_search_movies()
            .times(2)
            .returning(|_| Err(api_down()));

        let url = resolver(mock).resolve("Se7en (1995)", Some(807)).await;
        assert_eq!(url, PLACEHOLDER);
        assert!(!url.is_empty());
    }

    struct StalledProvider;

    #[async_trait::async_trait]
    impl MetadataProvider for StalledProvider {
        async fn movie_details(&self, _id: u64) -> AppResult<TmdbMovieDetails> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(TmdbMovieDetails {
                id: 1,
                title: None,
                poster_path: Some("/too-late.jpg".to_string()),
            })
        }

        async fn search_movies(&self, _query: &str) -> AppResult<Vec<TmdbSearchResult>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![result("Late", Some("/too-late.jpg"))])
        }

        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_timeouts_fall_through_to_placeholder() {
        let resolver = PosterResolver::new(Arc::new(StalledProvider), settings());

        let url = resolver.resolve("Some Movie (2020)!", Some(42)).await;
        assert_eq!(url, PLACEHOLDER);
    }

    #[test]
    fn test_simplify_title() {
        assert_eq!(simplify_title("Some Movie (2020)!"), "Some Movie");
        assert_eq!(simplify_title("Star Wars: Episode IV"), "Star Wars Episode IV");
        assert_eq!(simplify_title("WALL-E"), "WALLE");
        assert_eq!(simplify_title("Alpha"), "Alpha");
        assert_eq!(simplify_title("(500) Days of Summer"), "Days of Summer");
        assert_eq!(simplify_title("Open (paren"), "Open paren");
        assert_eq!(simplify_title("!!!"), "");
        assert_eq!(simplify_title("A (b (c) d) e"), "A  d e");
        assert_eq!(simplify_title("X (y (z) w"), "X  w");
    }

    #[test]
    fn test_best_match_ignores_exact_match_without_poster() {
        let results = vec![result("Up", None), result("Up in the Air", Some("/air.jpg"))];
        assert_eq!(best_match(&results, "Up"), Some("/air.jpg"));
    }

    #[test]
    fn test_best_match_empty_results() {
        assert_eq!(best_match(&[], "Up"), None);
    }

    #[test]
    fn test_image_url_joins_segments() {
        let resolver = resolver(MockMetadataProvider::new());
        assert_eq!(
            resolver.image_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            resolver.image_url("abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn test_resolve_can_be_driven_synchronously() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_search_movies()
            .returning(|_| Ok(vec![result("Brazil", Some("/brazil.jpg"))]));
        let resolver = resolver(mock);

        let url = tokio_test::block_on(resolver.resolve("Brazil", None));
        assert_eq!(url, "https://image.tmdb.org/t/p/w500/brazil.jpg");
    }
}
