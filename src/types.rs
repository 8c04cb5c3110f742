//! Core types for tiktok-dl

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One URL submitted for retrieval
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievalRequest {
    url: String,
}

impl RetrievalRequest {
    /// Create a request for the given page URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The page URL as supplied by the caller
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for RetrievalRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Which retrieval strategy a batch uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Direct metadata API plus HTTP transfer (default)
    #[default]
    Api,
    /// External yt-dlp process
    YtDlp,
}

impl StrategyKind {
    /// Map a user-supplied selector onto a strategy
    ///
    /// Exactly `"ytdlp"` selects the external tool; any other value,
    /// including an empty one or a different spelling, selects the API.
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "ytdlp" => StrategyKind::YtDlp,
            _ => StrategyKind::Api,
        }
    }

    /// Label used in progress output
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::Api => "API",
            StrategyKind::YtDlp => "yt-dlp",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal result recorded for one item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The item was saved under `filename` in the download directory
    Success {
        /// Name of the file that was written
        filename: String,
    },
    /// The item could not be retrieved
    Failure {
        /// Human-readable reason
        reason: String,
    },
}

impl Outcome {
    /// Returns `true` for [`Outcome::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Outcome of one item together with the URL it was for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    /// The page URL
    pub url: String,
    /// What happened to it
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Accumulated result of a batch run
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Items saved successfully
    pub success_count: usize,
    /// Items that failed
    pub fail_count: usize,
    /// Per-item reports in dispatch order
    pub items: Vec<ItemReport>,
}

impl BatchResult {
    /// Record the outcome of one dispatched item
    pub(crate) fn record(&mut self, url: &str, outcome: Outcome) {
        if outcome.is_success() {
            self.success_count += 1;
        } else {
            self.fail_count += 1;
        }
        self.items.push(ItemReport {
            url: url.to_string(),
            outcome,
        });
    }

    /// Number of items dispatched
    pub fn total(&self) -> usize {
        self.success_count + self.fail_count
    }

    /// Whether every dispatched item succeeded
    pub fn all_succeeded(&self) -> bool {
        self.fail_count == 0
    }

    /// URLs of the items that failed, in dispatch order
    ///
    /// Feed these back into a fresh run to retry only the failures.
    pub fn failed_urls(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| !item.outcome.is_success())
            .map(|item| item.url.as_str())
            .collect()
    }
}

/// Events emitted by the batch orchestrator
///
/// Consumers subscribe with [`crate::BatchDownloader::subscribe`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Validation passed and dispatch is about to begin
    BatchStarted {
        /// Number of validated URLs
        total: usize,
        /// Active strategy
        strategy: StrategyKind,
    },

    /// An item is being dispatched
    ItemStarted {
        /// Zero-based position in the batch
        index: usize,
        /// Number of validated URLs
        total: usize,
        /// The page URL
        url: String,
    },

    /// An item was saved
    ItemSucceeded {
        /// Zero-based position in the batch
        index: usize,
        /// The page URL
        url: String,
        /// Name of the file that was written
        filename: String,
    },

    /// An item failed
    ItemFailed {
        /// Zero-based position in the batch
        index: usize,
        /// The page URL
        url: String,
        /// Human-readable reason
        reason: String,
    },

    /// The orchestrator is waiting before the next dispatch
    Pacing {
        /// How long it waits
        delay: Duration,
    },

    /// Cancellation stopped the batch before every item was dispatched
    BatchCancelled {
        /// Number of items dispatched before cancellation
        dispatched: usize,
    },

    /// All dispatched items have resolved
    BatchFinished {
        /// Final counts
        result: BatchResult,
    },
}
