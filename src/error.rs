//! Error types for tiktok-dl
//!
//! This module provides the error taxonomy for the library:
//! - A top-level [`Error`] returned by every fallible operation
//! - Item-scoped sub-errors for metadata resolution, byte transfer and the
//!   external downloader process
//! - Stable machine-readable codes for structured logging

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tiktok-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tiktok-dl
///
/// Validation and configuration errors are fatal to a batch. Every other
/// variant is scoped to a single item and is downgraded to a recorded
/// failure by the orchestrator (see [`Error::is_item_scoped`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "url_filter")
        key: Option<String>,
    },

    /// No usable URLs were supplied to a batch
    #[error("{0}")]
    Validation(String),

    /// Metadata lookup failed or returned nothing playable
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Network or filesystem failure while transferring bytes
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The external downloader could not be run or exited non-zero
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),

    /// An item did not finish within the configured per-item timeout
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The run was aborted while an item was still in flight
    #[error("interrupted before the batch finished")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation not supported (missing binary, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Metadata lookup errors (Direct API strategy)
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The endpoint answered with a non-zero code or without a data payload
    ///
    /// Displays as the bare message so callers see exactly what the API said.
    #[error("{message}")]
    Api {
        /// The status code reported by the endpoint, if any
        code: Option<i64>,
        /// The endpoint's message, or a generic fallback
        message: String,
    },

    /// The payload carried neither an HD nor a standard media URL
    #[error("No video URL found")]
    NoMediaUrl,

    /// The endpoint itself answered with an HTTP error status
    #[error("metadata endpoint returned HTTP {status}")]
    HttpStatus {
        /// The HTTP status code
        status: u16,
    },
}

/// Byte transfer errors (Transfer Fetcher)
#[derive(Debug, Error)]
pub enum TransferError {
    /// The request could not be sent or the body could not be read
    #[error("request to {url} failed: {source}")]
    Request {
        /// The URL being fetched when the failure happened
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a terminal non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The URL that produced the status
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// A redirect response carried no usable `Location` header
    #[error("redirect from {url} (HTTP {status}) has no usable Location header")]
    MissingLocation {
        /// The URL that answered with the redirect
        url: String,
        /// The redirect status code
        status: u16,
    },

    /// A URL could not be parsed or resolved
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Why parsing failed
        reason: String,
    },

    /// Writing the destination file failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// The destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// External downloader process errors (External Tool strategy)
#[derive(Debug, Error)]
pub enum SubprocessError {
    /// The executable could not be started
    #[error("failed to execute {binary}: {source}")]
    Spawn {
        /// Path of the executable
        binary: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a non-zero status
    #[error("yt-dlp failed (exit code {}): {output}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    Failed {
        /// Exit code, `None` if terminated by a signal
        code: Option<i32>,
        /// Combined stdout/stderr captured from the process
        output: String,
    },
}

impl Error {
    /// Create a configuration error for the given key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Whether this error is confined to a single item
    ///
    /// Item-scoped errors are recorded as a failed outcome and the batch
    /// continues. Everything else ends the batch as a whole.
    pub fn is_item_scoped(&self) -> bool {
        !matches!(
            self,
            Error::Config { .. }
                | Error::Validation(_)
                | Error::NotSupported(_)
                | Error::Cancelled
        )
    }

    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Resolution(e) => match e {
                ResolutionError::Api { .. } => "api_error",
                ResolutionError::NoMediaUrl => "no_media_url",
                ResolutionError::HttpStatus { .. } => "api_http_error",
            },
            Error::Transfer(e) => match e {
                TransferError::Request { .. } => "transfer_request_failed",
                TransferError::Status { .. } => "transfer_bad_status",
                TransferError::MissingLocation { .. } => "transfer_bad_redirect",
                TransferError::InvalidUrl { .. } => "transfer_invalid_url",
                TransferError::Write { .. } => "transfer_write_failed",
            },
            Error::Subprocess(e) => match e {
                SubprocessError::Spawn { .. } => "subprocess_spawn_failed",
                SubprocessError::Failed { .. } => "subprocess_failed",
            },
            Error::Timeout(_) => "timeout",
            Error::Cancelled => "cancelled",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::NotSupported(_) => "not_supported",
        }
    }
}
