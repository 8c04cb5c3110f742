//! External tool strategy using the yt-dlp binary

use super::parser::{FALLBACK_FILENAME, extract_filename};
use super::traits::RetrievalStrategy;
use crate::config::Config;
use crate::error::{Result, SubprocessError};
use crate::types::{RetrievalRequest, StrategyKind};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Runs yt-dlp once per item
///
/// The URL is passed as a discrete argument after `--`; no shell is involved.
/// yt-dlp paces itself, so this strategy never asks for a pause between items.
///
/// # Examples
///
/// ```no_run
/// use tiktok_dl::strategy::{RetrievalStrategy, YtDlpResolver};
/// use tiktok_dl::{Config, RetrievalRequest};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let binary = YtDlpResolver::discover().expect("yt-dlp not found in PATH");
/// let resolver = YtDlpResolver::new(binary, &Config::default());
/// let name = resolver
///     .resolve(&RetrievalRequest::new("https://www.tiktok.com/@user/video/123"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct YtDlpResolver {
    binary_path: PathBuf,
    download_dir: PathBuf,
    output_template: String,
    extra_args: Vec<String>,
}

impl YtDlpResolver {
    /// Create a resolver for an explicit binary path
    pub fn new(binary_path: PathBuf, config: &Config) -> Self {
        Self {
            binary_path,
            download_dir: config.download.download_dir.clone(),
            output_template: config.tool.output_template.clone(),
            extra_args: config.tool.extra_args.clone(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn discover() -> Option<PathBuf> {
        which::which("yt-dlp").ok()
    }

    /// Path of the executable this resolver runs
    pub fn binary_path(&self) -> &std::path::Path {
        &self.binary_path
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("-o")
            .arg(&self.output_template)
            .arg("--no-playlist")
            .arg("--paths")
            .arg(&self.download_dir)
            .args(&self.extra_args)
            .arg("--")
            .arg(url)
            .kill_on_drop(true);
        cmd
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (false, false) => format!("{}\n{}", stdout.trim_end(), stderr.trim_end()),
        (false, true) => stdout.trim_end().to_string(),
        (true, _) => stderr.trim_end().to_string(),
    }
}

#[async_trait]
impl RetrievalStrategy for YtDlpResolver {
    async fn resolve(&self, request: &RetrievalRequest) -> Result<String> {
        tracing::info!(url = %request, binary = ?self.binary_path, "running yt-dlp");

        let output = self
            .command(request.url())
            .output()
            .await
            .map_err(|source| SubprocessError::Spawn {
                binary: self.binary_path.clone(),
                source,
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);

        if !output.status.success() {
            return Err(SubprocessError::Failed {
                code: output.status.code(),
                output: combined,
            }
            .into());
        }

        let filename = extract_filename(&combined).unwrap_or_else(|| {
            tracing::debug!(url = %request, "no filename in yt-dlp output, using placeholder");
            FALLBACK_FILENAME.to_string()
        });
        Ok(filename)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::YtDlp
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn pacing_delay(&self) -> Option<Duration> {
        None
    }
}
