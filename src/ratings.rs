use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::ResponseCache;
use crate::config::{CacheConfig, RatingsConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingInfo {
    pub rating: f64,
    pub url: String,
}

/// Secondary rating source, looked up by IMDb identifier.
#[async_trait]
pub trait RatingLookup: Send + Sync {
    async fn lookup(&self, imdb_id: &str) -> Option<RatingInfo>;

    fn is_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: Option<String>,
}

pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    answers: ResponseCache<Option<RatingInfo>>,
}

impl OmdbClient {
    pub fn new(config: &RatingsConfig, cache: &CacheConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            answers: ResponseCache::new(cache),
        })
    }

    async fn fetch(&self, imdb_id: &str, api_key: &str) -> Result<Option<RatingInfo>, reqwest::Error> {
        let resp: OmdbResponse = self
            .http
            .get(format!("{}/", self.base_url))
            .query(&[("i", imdb_id), ("apikey", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.response != "True" {
            return Ok(None);
        }

        Ok(resp
            .imdb_rating
            .and_then(|r| r.parse::<f64>().ok())
            .map(|rating| RatingInfo {
                rating,
                url: imdb_url(imdb_id),
            }))
    }
}

#[async_trait]
impl RatingLookup for OmdbClient {
    async fn lookup(&self, imdb_id: &str) -> Option<RatingInfo> {
        let api_key = self.api_key.as_deref()?;
        if imdb_id.is_empty() {
            return None;
        }

        if let Some(cached) = self.answers.get(imdb_id).await {
            return cached;
        }

        // Transport and server failures are retried on the next lookup.
        match self.fetch(imdb_id, api_key).await {
            Ok(info) => {
                self.answers.insert(imdb_id.to_string(), info.clone()).await;
                info
            }
            Err(e) => {
                debug!("Rating lookup for {} failed: {}", imdb_id, e);
                None
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

pub fn imdb_url(imdb_id: &str) -> String {
    format!("https://www.imdb.com/title/{}/", imdb_id)
}
