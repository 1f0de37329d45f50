use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default = "default_logfile")]
    pub logfile: String,
    #[serde(default)]
    pub logformat: LogFormat,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub ratings: RatingsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(skip)]
    pub debug_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url", alias = "baseurl")]
    pub base_url: String,
    #[serde(default, alias = "apikey")]
    pub api_key: Option<String>,
    #[serde(default = "default_display_language")]
    pub language: String,
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            api_key: None,
            language: default_display_language(),
            timeout_secs: default_catalog_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatingsConfig {
    #[serde(default = "default_ratings_url", alias = "baseurl")]
    pub base_url: String,
    #[serde(default, alias = "apikey")]
    pub api_key: Option<String>,
    #[serde(default = "default_ratings_timeout")]
    pub timeout_secs: u64,
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            base_url: default_ratings_url(),
            api_key: None,
            timeout_secs: default_ratings_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_cache_ttl(),
            max_entries: default_cache_entries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_genres_file", alias = "genresfile")]
    pub genres_file: String,
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    #[serde(default = "default_page_size", alias = "pagesize")]
    pub page_size: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            genres_file: default_genres_file(),
            fetch_limit: default_fetch_limit(),
            page_size: default_page_size(),
        }
    }
}

fn default_port() -> String {
    "8097".to_string()
}

fn default_logfile() -> String {
    "stdout".to_string()
}

fn default_catalog_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_display_language() -> String {
    "en-US".to_string()
}

fn default_catalog_timeout() -> u64 {
    10
}

fn default_ratings_url() -> String {
    "http://www.omdbapi.com".to_string()
}

fn default_ratings_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_cache_entries() -> usize {
    512
}

fn default_genres_file() -> String {
    "data/genres.json".to_string()
}

fn default_fetch_limit() -> usize {
    50
}

fn default_page_size() -> usize {
    12
}

pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(path, &content)
    }

    pub fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }

    /// Fill in API keys from the environment where the file left them out.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if is_blank(&self.catalog.api_key) {
            self.catalog.api_key = lookup(TMDB_API_KEY_ENV).filter(|k| !k.trim().is_empty());
        }
        if is_blank(&self.ratings.api_key) {
            self.ratings.api_key = lookup(OMDB_API_KEY_ENV).filter(|k| !k.trim().is_empty());
        }
    }

    pub fn catalog_api_key(&self) -> Result<&str, ConfigError> {
        match self.catalog.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey(TMDB_API_KEY_ENV)),
        }
    }

    pub fn log_to_stdout(&self) -> bool {
        self.logfile.is_empty() || self.logfile == "stdout"
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("No catalog API key configured (set catalog.api_key or {0})")]
    MissingApiKey(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_yaml("test.yaml", "{}").unwrap();
        assert_eq!(config.listen.port, "8097");
        assert_eq!(config.logfile, "stdout");
        assert_eq!(config.logformat, LogFormat::Text);
        assert_eq!(config.catalog.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.catalog.language, "en-US");
        assert_eq!(config.catalog.timeout_secs, 10);
        assert_eq!(config.ratings.timeout_secs, 5);
        assert!(config.cache.enabled);
        assert_eq!(config.discovery.page_size, 12);
        assert_eq!(config.discovery.fetch_limit, 50);
        assert!(config.log_to_stdout());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
listen:
  address: 127.0.0.1
  port: "9000"
logfile: /var/log/cinefind.log
logformat: json
catalog:
  apikey: abc123
  timeout_secs: 3
cache:
  enabled: false
discovery:
  genresfile: /etc/cinefind/genres.json
  pagesize: 8
"#;
        let config = Config::from_yaml("test.yaml", yaml).unwrap();
        assert_eq!(config.listen.address.as_deref(), Some("127.0.0.1"));
        assert_eq!(config.listen.port, "9000");
        assert_eq!(config.logformat, LogFormat::Json);
        assert!(!config.log_to_stdout());
        assert_eq!(config.catalog_api_key().unwrap(), "abc123");
        assert_eq!(config.catalog.timeout_secs, 3);
        assert!(!config.cache.enabled);
        assert_eq!(config.discovery.genres_file, "/etc/cinefind/genres.json");
        assert_eq!(config.discovery.page_size, 8);
    }

    #[test]
    fn test_env_fills_missing_keys_only() {
        let mut config = Config::from_yaml("test.yaml", "ratings:\n  api_key: file-key\n").unwrap();
        config.apply_env_from(|name| match name {
            TMDB_API_KEY_ENV => Some("env-tmdb".to_string()),
            OMDB_API_KEY_ENV => Some("env-omdb".to_string()),
            _ => None,
        });
        assert_eq!(config.catalog.api_key.as_deref(), Some("env-tmdb"));
        assert_eq!(config.ratings.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_missing_catalog_key() {
        let mut config = Config::default();
        config.apply_env_from(|_| None);
        assert!(matches!(
            config.catalog_api_key(),
            Err(ConfigError::MissingApiKey(TMDB_API_KEY_ENV))
        ));
    }

    #[test]
    fn test_bad_yaml() {
        assert!(matches!(
            Config::from_yaml("bad.yaml", "listen: [unclosed"),
            Err(ConfigError::ParseError(..))
        ));
    }
}
