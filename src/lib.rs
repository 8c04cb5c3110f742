//! # tiktok-dl
//!
//! Sequential batch downloader for TikTok videos.
//!
//! A batch takes a free-text blob of URLs, keeps the tokens that look like
//! TikTok links, and retrieves them one at a time with one of two
//! interchangeable strategies:
//! - **API** - a metadata endpoint resolves the page to a media URL, which is
//!   then streamed to disk (paced to respect the endpoint's rate limit)
//! - **yt-dlp** - an external `yt-dlp` process downloads each item itself
//!
//! Every item ends in a success or a recorded failure; one bad item never
//! stops the batch.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tiktok_dl::{BatchDownloader, Config, Event, StrategyKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = BatchDownloader::new(Config::default(), StrategyKind::Api).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let result = downloader
//!         .run("https://www.tiktok.com/@a/video/1 https://www.tiktok.com/@a/video/2")
//!         .await?;
//!     println!("{} success, {} failed", result.success_count, result.fail_count);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Batch orchestration
pub mod batch;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Filename derivation
pub mod naming;
/// Retrieval strategies
pub mod strategy;
/// Single-resource HTTP transfer
pub mod transfer;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use batch::BatchDownloader;
pub use config::Config;
pub use error::{Error, ResolutionError, Result, SubprocessError, TransferError};
pub use strategy::{ApiResolver, RetrievalStrategy, YtDlpResolver};
pub use transfer::TransferFetcher;
pub use types::{BatchResult, Event, ItemReport, Outcome, RetrievalRequest, StrategyKind};
