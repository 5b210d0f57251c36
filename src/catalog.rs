//! Client for the remote exercise catalog.
//!
//! The catalog is read-only and unauthenticated apart from two static headers.
//! Failures surface as [`CatalogError`]; they never touch stored workouts.

use crate::exercise::Exercise;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HOST: &str = "exercisedb.p.rapidapi.com";
pub const DEFAULT_LIMIT: u32 = 800;

const API_KEY_HEADER: &str = "x-rapidapi-key";
const API_HOST_HEADER: &str = "x-rapidapi-host";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("catalog configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Transport-level failure (no response, or a non-success response).
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Network(_) | CatalogError::Status { .. })
    }
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub api_key: SecretString,
    pub host: String,
    pub base_url: String,
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, CatalogError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads configuration through `get` so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, CatalogError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_key = get("WORKOUT_CATALOG_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CatalogError::Config("WORKOUT_CATALOG_API_KEY missing".into()))?;
        let host = get("WORKOUT_CATALOG_HOST").unwrap_or_else(|| DEFAULT_HOST.into());
        let base_url = get("WORKOUT_CATALOG_BASE_URL").unwrap_or_else(|| format!("https://{host}"));
        Ok(Self {
            api_key: SecretString::new(api_key.into()),
            host,
            base_url,
        })
    }
}

#[async_trait]
pub trait ExerciseCatalog: Send + Sync {
    async fn fetch_exercises(&self, limit: u32, offset: u32) -> Result<Vec<Exercise>, CatalogError>;
}

#[derive(Clone, Debug)]
pub struct ReqwestCatalogClient {
    base_url: String,
    host: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl ReqwestCatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            host: config.host,
            api_key: config.api_key,
            client,
        })
    }
}

#[async_trait]
impl ExerciseCatalog for ReqwestCatalogClient {
    async fn fetch_exercises(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Exercise>, CatalogError> {
        let url = format!("{}/exercises", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("limit", limit), ("offset", offset)])
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .header(API_HOST_HEADER, &self.host)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(256).collect(),
            });
        }

        let bytes = resp.bytes().await?;
        let exercises: Vec<Exercise> = serde_json::from_slice(&bytes)?;
        debug!(count = exercises.len(), limit, offset, "fetched exercises");
        Ok(exercises)
    }
}
