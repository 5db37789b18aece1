use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    error::{ApiError, ErrorBody, ErrorCode},
    protocol::{HealthResponse, Paper, PapersResponse},
};
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub mod controller;
pub mod error;
pub mod filters;
pub mod view;

pub use config::{load_settings, load_settings_from, ClientSettings};
pub use controller::{ControllerEvent, FetchController, FetchState};
pub use error::FetchError;
pub use filters::{parse_year_input, FilterChange, FilterState, PapersQuery};
pub use view::{CatalogView, PaginationControls, ResultsSummary, ViewAction};

const LIST_PAPERS_FALLBACK: &str = "Failed to fetch papers";
const GET_PAPER_FALLBACK: &str = "Failed to fetch paper";
const HEALTH_FALLBACK: &str = "Failed to reach catalog";

/// Where the fetch controller gets its pages from.
#[async_trait]
pub trait PaperSource: Send + Sync {
    async fn list_papers(&self, query: &PapersQuery) -> Result<PapersResponse, ApiError>;
}

/// HTTP client for the paper catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(api_base_url: &str) -> Result<Self> {
        Self::from_settings(&ClientSettings {
            api_base_url: api_base_url.to_string(),
            ..ClientSettings::default()
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let normalized = config::normalize_api_base_url(&settings.api_base_url);
        // Trailing slash so relative joins append instead of replacing the last segment.
        let base_url = Url::parse(&format!("{normalized}/"))
            .with_context(|| format!("invalid catalog API url '{}'", settings.api_base_url))?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build catalog http client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_papers(&self, query: &PapersQuery) -> Result<PapersResponse, ApiError> {
        let url = self.endpoint("api/papers", LIST_PAPERS_FALLBACK)?;
        let response: PapersResponse = self
            .get_json(url, &query.to_pairs(), LIST_PAPERS_FALLBACK)
            .await?;
        debug!(
            count = response.count,
            page = response.page,
            returned = response.papers.len(),
            "fetched paper page"
        );
        Ok(response)
    }

    pub async fn get_paper(&self, paper_id: &str) -> Result<Paper, ApiError> {
        let mut url = self.endpoint("api/papers", GET_PAPER_FALLBACK)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::with_code(500, ErrorCode::Client, GET_PAPER_FALLBACK))?
            .push(paper_id);
        self.get_json(url, &[], GET_PAPER_FALLBACK).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint("api/health", HEALTH_FALLBACK)?;
        self.get_json(url, &[], HEALTH_FALLBACK).await
    }

    fn endpoint(&self, path: &str, fallback: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|err| {
            ApiError::with_code(500, ErrorCode::Client, format!("{fallback}: {err}"))
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
        fallback: &str,
    ) -> Result<T, ApiError> {
        let res = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|err| {
                warn!(%url, error = %err, timeout = err.is_timeout(), "catalog request failed");
                ApiError::with_code(500, ErrorCode::Network, format!("{fallback}: {err}"))
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.json::<ErrorBody>().await.unwrap_or_default();
            let message = body
                .into_message()
                .unwrap_or_else(|| fallback.to_string());
            warn!(%url, status = status.as_u16(), %message, "catalog returned error status");
            return Err(ApiError::new(status.as_u16(), message));
        }

        res.json::<T>().await.map_err(|err| {
            warn!(%url, error = %err, "catalog response did not decode");
            ApiError::with_code(
                500,
                ErrorCode::InvalidResponse,
                format!("{fallback}: invalid response body"),
            )
        })
    }
}

#[async_trait]
impl PaperSource for CatalogClient {
    async fn list_papers(&self, query: &PapersQuery) -> Result<PapersResponse, ApiError> {
        CatalogClient::list_papers(self, query).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
