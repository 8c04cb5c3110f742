//! Batch orchestrator.
//!
//! [`BatchDownloader`] owns one strategy for the lifetime of a batch and
//! walks the validated URLs strictly one at a time:
//! - [`validate`] - raw input to an ordered list of requests
//! - [`dispatch`] - the sequential dispatch loop, pacing and cancellation
//!
//! Per-item errors become [`Outcome::Failure`](crate::types::Outcome) entries
//! in the returned [`BatchResult`](crate::types::BatchResult); only
//! validation failures abort a run.

mod dispatch;
mod validate;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use validate::parse_urls;

use crate::config::Config;
use crate::error::Result;
use crate::strategy::{self, RetrievalStrategy};
use crate::types::{Event, StrategyKind};
use crate::utils;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Capacity of the event channel; slow subscribers lag rather than block
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Sequential batch downloader
///
/// # Examples
///
/// ```no_run
/// use tiktok_dl::{BatchDownloader, Config, StrategyKind};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = BatchDownloader::new(Config::default(), StrategyKind::Api).await?;
/// let result = downloader
///     .run("https://www.tiktok.com/@a/video/1\nhttps://www.tiktok.com/@a/video/2")
///     .await?;
/// println!("{} success, {} failed", result.success_count, result.fail_count);
/// # Ok(())
/// # }
/// ```
pub struct BatchDownloader {
    strategy: Arc<dyn RetrievalStrategy>,
    config: Arc<Config>,
    event_tx: broadcast::Sender<Event>,
    cancel_token: CancellationToken,
}

impl BatchDownloader {
    /// Create a downloader using the strategy selected by `kind`
    ///
    /// Validates the configuration, creates the download directory (with
    /// parents) and builds the strategy.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid settings, `Error::Io` if the
    /// directory cannot be created, and `Error::NotSupported` if yt-dlp is
    /// selected but cannot be found.
    pub async fn new(config: Config, kind: StrategyKind) -> Result<Self> {
        config.validate()?;
        utils::ensure_dir(config.download_dir()).await?;
        let strategy = strategy::build(kind, &config)?;
        tracing::debug!(
            strategy = strategy.name(),
            dir = ?config.download_dir(),
            "batch downloader ready"
        );
        Ok(Self::with_strategy(config, strategy))
    }

    /// Create a downloader around an already-built strategy
    pub fn with_strategy(config: Config, strategy: Arc<dyn RetrievalStrategy>) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            strategy,
            config: Arc::new(config),
            event_tx,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The active strategy
    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// The configuration this downloader was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stop the batch before the next dispatch
    ///
    /// The item in flight finishes normally; a pacing pause is cut short.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Token observed between dispatches, for wiring to signal handlers
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}
