//! Input validation: raw text blob to an ordered list of requests.

use crate::error::{Error, Result};
use crate::types::RetrievalRequest;

/// Split raw input into requests
///
/// Tokens are separated by any run of whitespace (spaces, tabs, newlines).
/// Tokens that do not contain `filter` are dropped silently. Order and
/// duplicates are preserved.
///
/// # Errors
///
/// Returns `Error::Validation` if the input is blank or if no token survives
/// the filter. Both are fatal to the batch: nothing is dispatched.
pub fn parse_urls(raw: &str, filter: &str) -> Result<Vec<RetrievalRequest>> {
    if raw.trim().is_empty() {
        return Err(Error::Validation("Please paste TikTok URLs".into()));
    }

    let requests: Vec<RetrievalRequest> = raw
        .split_whitespace()
        .map(str::trim)
        .filter(|token| token.contains(filter))
        .map(RetrievalRequest::new)
        .collect();

    if requests.is_empty() {
        return Err(Error::Validation("No valid TikTok URLs found".into()));
    }

    Ok(requests)
}
