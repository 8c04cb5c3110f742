//! Retrieval strategies
//!
//! A strategy turns one page URL into one file in the download directory.
//! The orchestrator only sees the [`RetrievalStrategy`] trait; which
//! implementation backs it is decided once per batch from a [`StrategyKind`].
//!
//! - [`ApiResolver`]: asks a metadata endpoint for the media URL, then
//!   downloads it with the [`TransferFetcher`](crate::transfer::TransferFetcher)
//! - [`YtDlpResolver`]: runs an external `yt-dlp` executable per item

mod api;
mod parser;
mod traits;
mod ytdlp;

pub use api::ApiResolver;
pub use parser::{FALLBACK_FILENAME, extract_filename};
pub use traits::RetrievalStrategy;
pub use ytdlp::YtDlpResolver;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::StrategyKind;
use std::sync::Arc;

/// Build the strategy selected by `kind`
///
/// # Errors
///
/// Returns `Error::NotSupported` when the external tool is selected but no
/// yt-dlp binary is configured or discoverable in `PATH`.
pub fn build(kind: StrategyKind, config: &Config) -> Result<Arc<dyn RetrievalStrategy>> {
    match kind {
        StrategyKind::Api => Ok(Arc::new(ApiResolver::new(config)?)),
        StrategyKind::YtDlp => {
            let binary = match (&config.tool.ytdlp_path, config.tool.search_path) {
                (Some(path), _) => path.clone(),
                (None, true) => YtDlpResolver::discover().ok_or_else(|| {
                    Error::NotSupported(
                        "yt-dlp not found in PATH. Install it or set tool.ytdlp_path.".into(),
                    )
                })?,
                (None, false) => {
                    return Err(Error::NotSupported(
                        "yt-dlp path not configured and PATH search is disabled".into(),
                    ));
                }
            };
            Ok(Arc::new(YtDlpResolver::new(binary, config)))
        }
    }
}
