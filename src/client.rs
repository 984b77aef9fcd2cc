use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;
use crate::data_models::{RawListing, SearchPage, SearchQuery};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// The two upstream calls the fetcher needs.
pub trait VacancyApi: Send + Sync {
    /// First page of search results for `query`.
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<SearchPage, FetchError>> + Send;

    /// Full record of a single vacancy.
    fn vacancy(&self, id: &str) -> impl Future<Output = Result<RawListing, FetchError>> + Send;
}

impl<T: VacancyApi> VacancyApi for Arc<T> {
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<SearchPage, FetchError>> + Send {
        (**self).search(query)
    }

    fn vacancy(&self, id: &str) -> impl Future<Output = Result<RawListing, FetchError>> + Send {
        (**self).vacancy(id)
    }
}

/// hh.ru public API client.
#[derive(Debug, Clone)]
pub struct HhClient {
    http: reqwest::Client,
    base_url: String,
}

impl HhClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| FetchError::Config(format!("user agent {user_agent:?}: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(&config.api_base_url, &config.user_agent, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, params: &[(&str, String)]) -> Result<T, FetchError> {
        let res = self.http.get(url).query(params).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl VacancyApi for HhClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, FetchError> {
        let url = format!("{}/vacancies", self.base_url);
        let mut params = vec![
            ("text", query.text().to_string()),
            ("area", query.region_id().to_string()),
            ("per_page", query.max_results().to_string()),
            ("page", "0".to_string()),
        ];
        if let Some(experience) = query.experience() {
            params.push(("experience", experience.as_api_value().to_string()));
        }

        log::info!("searching vacancies: {}", query.cache_key());
        self.get_json(&url, &params).await
    }

    async fn vacancy(&self, id: &str) -> Result<RawListing, FetchError> {
        let url = format!("{}/vacancies/{}", self.base_url, id);
        log::debug!("fetching vacancy {id}");
        self.get_json(&url, &[]).await
    }
}
