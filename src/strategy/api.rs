//! Direct API strategy: metadata lookup followed by an HTTP transfer

use super::traits::RetrievalStrategy;
use crate::config::{ApiConfig, Config};
use crate::error::{ResolutionError, Result};
use crate::naming::{FilenameParts, build_filename};
use crate::transfer::TransferFetcher;
use crate::types::{RetrievalRequest, StrategyKind};
use crate::utils::get_unique_path;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Message used when the endpoint fails without saying why
const FALLBACK_API_MESSAGE: &str = "Failed to fetch video";

/// Response envelope returned by the metadata endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub(crate) code: Option<i64>,
    #[serde(default)]
    pub(crate) msg: Option<String>,
    #[serde(default)]
    pub(crate) data: Option<VideoData>,
}

/// The `data` payload describing one video
#[derive(Debug, Default, Deserialize)]
pub(crate) struct VideoData {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) hdplay: Option<String>,
    #[serde(default)]
    pub(crate) play: Option<String>,
    #[serde(default)]
    pub(crate) author: Option<Author>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Author {
    #[serde(default)]
    pub(crate) unique_id: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl ApiResponse {
    /// Unwrap the payload, turning API-level failures into errors
    pub(crate) fn into_data(self) -> std::result::Result<VideoData, ResolutionError> {
        match (self.code, self.data) {
            (Some(0), Some(data)) => Ok(data),
            (code, _) => Err(ResolutionError::Api {
                code,
                message: non_empty(&self.msg)
                    .unwrap_or(FALLBACK_API_MESSAGE)
                    .to_string(),
            }),
        }
    }
}

impl VideoData {
    /// Best playable URL: HD first, then the standard variant
    pub(crate) fn media_url(&self) -> Option<&str> {
        non_empty(&self.hdplay).or_else(|| non_empty(&self.play))
    }

    fn author_id(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| non_empty(&a.unique_id))
    }
}

/// Resolves page URLs through the metadata endpoint and downloads the result
///
/// One metadata request and one transfer per item. The endpoint rate-limits
/// callers, so this strategy asks the orchestrator for a pause between items.
pub struct ApiResolver {
    client: reqwest::Client,
    fetcher: TransferFetcher,
    api: ApiConfig,
    download_dir: PathBuf,
    extension: String,
    pacing_delay: Duration,
}

impl ApiResolver {
    /// Create a resolver from the batch configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .user_agent(config.transfer.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            fetcher: TransferFetcher::new(&config.transfer)?,
            api: config.api.clone(),
            download_dir: config.download.download_dir.clone(),
            extension: config.download.extension.clone(),
            pacing_delay: config.download.pacing_delay,
        })
    }

    async fn lookup(&self, page_url: &str) -> Result<VideoData> {
        let hd = if self.api.hd { "1" } else { "0" };
        let response = self
            .client
            .get(&self.api.endpoint)
            .query(&[("url", page_url), ("hd", hd)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::HttpStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await?;
        let parsed: ApiResponse = serde_json::from_slice(&body)?;
        Ok(parsed.into_data()?)
    }
}

#[async_trait]
impl RetrievalStrategy for ApiResolver {
    async fn resolve(&self, request: &RetrievalRequest) -> Result<String> {
        tracing::info!(url = %request, "fetching metadata");

        let data = self.lookup(request.url()).await?;
        let media_url = data.media_url().ok_or(ResolutionError::NoMediaUrl)?;

        let filename = build_filename(FilenameParts {
            author: data.author_id(),
            title: non_empty(&data.title),
            default_author: &self.api.default_author,
            default_title: &self.api.default_title,
            title_max_chars: self.api.title_max_chars,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            extension: &self.extension,
        });
        let destination = get_unique_path(&self.download_dir.join(&filename))?;
        let filename = destination
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or(filename);

        tracing::info!(url = %request, filename = %filename, "downloading");
        let bytes = self.fetcher.fetch(media_url, &destination).await?;
        tracing::debug!(path = ?destination, bytes, "saved");

        Ok(filename)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Api
    }

    fn name(&self) -> &'static str {
        "api"
    }

    fn pacing_delay(&self) -> Option<Duration> {
        Some(self.pacing_delay)
    }
}
