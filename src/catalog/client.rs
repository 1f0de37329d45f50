use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::cache::{cache_key, ResponseCache};
use super::types::{Movie, MovieDetails, MoviePage};
use crate::config::CatalogConfig;
use crate::query::Parameters;

const MAX_DISCOVER_PAGES: u32 = 5;

/// The movie catalog as seen by the discovery service.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn discover(&self, params: &Parameters, limit: usize) -> Result<Vec<Movie>, CatalogError>;
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<Movie>, CatalogError>;
    async fn details(&self, id: u64) -> Result<MovieDetails, CatalogError>;
}

pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
    cache: Arc<ResponseCache>,
}

impl TmdbClient {
    pub fn new(
        config: &CatalogConfig,
        api_key: &str,
        cache: Arc<ResponseCache>,
    ) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            language: config.language.clone(),
            cache,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        mut params: Vec<(String, String)>,
    ) -> Result<T, CatalogError> {
        if !params.iter().any(|(k, _)| k == "language") {
            params.push(("language".to_string(), self.language.clone()));
        }

        let key = cache_key(path, &params);
        if let Some(value) = self.cache.get(&key).await {
            return Ok(serde_json::from_value(value)?);
        }

        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("GET {} {:?}", url, params);

        let resp = self
            .http
            .get(&url)
            .query(&params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("HTTP error for {} -> {} {}", url, status.as_u16(), body);
            return Err(CatalogError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let value: serde_json::Value = resp.json().await?;
        let decoded = serde_json::from_value(value.clone())?;
        self.cache.insert(key, value).await;
        Ok(decoded)
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    /// Pages through the discover endpoint until `limit` results are
    /// collected, the catalog runs out of pages, or five pages were read.
    async fn discover(&self, params: &Parameters, limit: usize) -> Result<Vec<Movie>, CatalogError> {
        let base: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();

        let mut results = Vec::new();
        let mut page = 1;
        while results.len() < limit && page <= MAX_DISCOVER_PAGES {
            let mut query = base.clone();
            query.push(("page".to_string(), page.to_string()));

            let data: MoviePage = self.get("/discover/movie", query).await?;
            results.extend(data.results);

            if page >= data.total_pages {
                break;
            }
            page += 1;
        }

        results.truncate(limit);
        Ok(results)
    }

    async fn search(&self, term: &str, limit: usize) -> Result<Vec<Movie>, CatalogError> {
        let query = vec![
            ("query".to_string(), term.to_string()),
            ("page".to_string(), "1".to_string()),
            ("include_adult".to_string(), "false".to_string()),
        ];
        let data: MoviePage = self.get("/search/movie", query).await?;

        let mut results = data.results;
        results.truncate(limit);
        Ok(results)
    }

    async fn details(&self, id: u64) -> Result<MovieDetails, CatalogError> {
        let query = vec![(
            "append_to_response".to_string(),
            "videos,credits".to_string(),
        )];
        self.get(&format!("/movie/{}", id), query).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Catalog returned status {status} for {path}")]
    Status { path: String, status: u16 },
    #[error("Failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::Status { status: 404, .. })
    }
}
