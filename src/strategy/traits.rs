//! The strategy trait shared by both retrieval backends

use crate::types::{RetrievalRequest, StrategyKind};
use async_trait::async_trait;
use std::time::Duration;

/// Trait for turning a page URL into a saved file
///
/// # Examples
///
/// ```no_run
/// use tiktok_dl::strategy::{ApiResolver, RetrievalStrategy};
/// use tiktok_dl::{Config, RetrievalRequest};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = ApiResolver::new(&Config::default())?;
/// let request = RetrievalRequest::new("https://www.tiktok.com/@user/video/123");
/// let filename = resolver.resolve(&request).await?;
/// println!("saved {filename}");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Retrieve one item into the download directory
    ///
    /// # Returns
    ///
    /// The name of the file that was written, relative to the download
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an item-scoped error (resolution, transfer, subprocess, I/O)
    /// when the item cannot be retrieved. Implementations must not leave a
    /// partial file behind on error.
    async fn resolve(&self, request: &RetrievalRequest) -> crate::Result<String>;

    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Delay the orchestrator must wait between two items, if any
    fn pacing_delay(&self) -> Option<Duration>;
}
