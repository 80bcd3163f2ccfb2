use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base path that poster paths are appended to
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Image width segment, e.g. `w500`
    #[serde(default = "default_poster_width")]
    pub poster_width: String,

    /// Returned when no strategy yields a poster
    #[serde(default = "default_placeholder_poster_url")]
    pub placeholder_poster_url: String,

    /// Timeout applied to every outbound metadata request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pre-built movie catalog (CSV)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Pre-built similarity matrix (JSON)
    #[serde(default = "default_similarity_path")]
    pub similarity_path: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_poster_width() -> String {
    "w500".to_string()
}

fn default_placeholder_poster_url() -> String {
    "https://via.placeholder.com/300x450?text=No+Image".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/movies.csv")
}

fn default_similarity_path() -> PathBuf {
    PathBuf::from("data/similarity.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
