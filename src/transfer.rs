//! HTTP(S) transfer of a single media resource to disk
//!
//! [`TransferFetcher`] follows redirects itself (the underlying client has
//! redirects disabled), streams the terminal 2xx body into the destination
//! file, and guarantees that a failed transfer leaves no file behind.

use crate::config::TransferConfig;
use crate::error::{Result, TransferError};
use futures::StreamExt;
use reqwest::header::LOCATION;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Fetches one URL into one file
#[derive(Clone, Debug)]
pub struct TransferFetcher {
    client: reqwest::Client,
}

impl TransferFetcher {
    /// Build a fetcher from transfer settings
    pub fn new(config: &TransferConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// Download `source_url` into `destination`
    ///
    /// Any 3xx answer with a `Location` header restarts the request at the new
    /// URL; there is no hop limit. A terminal 2xx body is streamed into
    /// `destination` (created or truncated). Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] for transport failures, terminal non-2xx
    /// statuses, redirects without a usable `Location`, and write failures.
    /// The destination file never survives an error.
    pub async fn fetch(&self, source_url: &str, destination: &Path) -> Result<u64> {
        let mut current = parse_url(source_url)?;

        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|source| TransferError::Request {
                    url: current.to_string(),
                    source,
                })?;

            let status = response.status();
            if status.is_redirection() {
                let next = redirect_target(&current, &response)?;
                tracing::debug!(
                    from = %current,
                    to = %next,
                    status = status.as_u16(),
                    "following redirect"
                );
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(TransferError::Status {
                    url: current.to_string(),
                    status: status.as_u16(),
                }
                .into());
            }

            return stream_to_file(&current, response, destination).await;
        }
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| {
        TransferError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn redirect_target(current: &Url, response: &reqwest::Response) -> Result<Url> {
    let status = response.status().as_u16();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| TransferError::MissingLocation {
            url: current.to_string(),
            status,
        })?;

    // Location may be relative to the URL that answered
    current.join(location.trim()).map_err(|e| {
        TransferError::InvalidUrl {
            url: location.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

async fn stream_to_file(url: &Url, response: reqwest::Response, destination: &Path) -> Result<u64> {
    let mut file = PartialFile::create(destination).await?;
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|source| TransferError::Request {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await?;
    }

    let written = file.commit().await?;
    tracing::debug!(url = %url, path = ?destination, bytes = written, "transfer complete");
    Ok(written)
}

/// A destination file that is removed on drop unless committed
///
/// Every failure path of a transfer (an early `?`, a dropped future after a
/// timeout or cancellation) ends in `Drop`, which deletes the partial file.
/// Deletion errors are logged and swallowed.
#[derive(Debug)]
pub(crate) struct PartialFile {
    path: PathBuf,
    file: Option<tokio::fs::File>,
    written: u64,
    committed: bool,
}

impl PartialFile {
    pub(crate) async fn create(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|source| TransferError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            written: 0,
            committed: false,
        })
    }

    pub(crate) async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Err(self.write_error(std::io::Error::other("file already closed")));
        };
        if let Err(source) = file.write_all(buf).await {
            return Err(self.write_error(source));
        }
        self.written += buf.len() as u64;
        Ok(())
    }

    /// Flush and keep the file, returning the number of bytes written
    pub(crate) async fn commit(mut self) -> Result<u64> {
        if let Some(mut file) = self.file.take()
            && let Err(source) = file.flush().await
        {
            return Err(self.write_error(source));
        }
        self.committed = true;
        Ok(self.written)
    }

    fn write_error(&self, source: std::io::Error) -> crate::Error {
        TransferError::Write {
            path: self.path.clone(),
            source,
        }
        .into()
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Close the handle before unlinking
        drop(self.file.take());
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = ?self.path, "removed partial file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "failed to remove partial file");
            }
        }
    }
}
