// fetch/mod.rs - External API Fetchers
// One GET per call against the weather, joke and quote APIs, decoded into
// typed schemas and formatted into a single chat line.
//
// Used by: dispatch.rs (through the ExternalApis trait), pong_bot.rs (HttpApis)

pub mod joke;
pub mod quote;
pub mod weather;

use crate::config::ApiConfig;
use async_trait::async_trait;
use thiserror::Error;

/// Why a fetch failed. Callers only care that it failed; the variant is for logs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Response is missing field `{0}`")]
    MissingField(&'static str),

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),
}

/// Formatted line on success, opaque failure otherwise.
pub type FetchResult = Result<String, FetchError>;

#[async_trait]
pub trait ExternalApis: Send + Sync {
    async fn weather(&self, city: &str) -> FetchResult;
    async fn joke(&self) -> FetchResult;
    async fn quote(&self) -> FetchResult;
}

/// `ExternalApis` over a shared reqwest client with no retries and no caching.
#[derive(Clone)]
pub struct HttpApis {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpApis {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ExternalApis for HttpApis {
    async fn weather(&self, city: &str) -> FetchResult {
        let api_key = self
            .config
            .weather_api_key
            .as_deref()
            .ok_or(FetchError::NotConfigured("WEATHER_API_KEY"))?;
        weather::fetch(&self.client, &self.config.weather_url, api_key, city).await
    }

    async fn joke(&self) -> FetchResult {
        joke::fetch(&self.client, &self.config.joke_url).await
    }

    async fn quote(&self) -> FetchResult {
        quote::fetch(&self.client, &self.config.quote_url).await
    }
}

/// GET `url` and return the body, rejecting non-2xx responses.
pub(crate) async fn get_success_body(
    client: &reqwest::Client,
    url: &str,
) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    Ok(response.text().await?)
}
