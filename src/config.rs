//! Configuration types for tiktok-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Batch behavior configuration (directory, filtering, pacing)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Download directory (default: "~/Downloads/tiktok videos")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Substring a token must contain to be accepted as a URL (default: "tiktok.com")
    #[serde(default = "default_url_filter")]
    pub url_filter: String,

    /// Delay between items for strategies that ask for pacing (default: 1100 ms)
    #[serde(default = "default_pacing_delay", with = "duration_serde")]
    pub pacing_delay: Duration,

    /// Upper bound on a single item, resolution and transfer included (None = unbounded)
    #[serde(default = "default_item_timeout", with = "optional_duration_serde")]
    pub item_timeout: Option<Duration>,

    /// Extension given to files named by the Direct API strategy (default: "mp4")
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            url_filter: default_url_filter(),
            pacing_delay: default_pacing_delay(),
            item_timeout: default_item_timeout(),
            extension: default_extension(),
        }
    }
}

/// Metadata endpoint settings for the Direct API strategy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Metadata lookup endpoint (default: "https://www.tikwm.com/api/")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Ask the endpoint for the HD variant (default: true)
    #[serde(default = "default_true")]
    pub hd: bool,

    /// Author token used when the payload has no author id (default: "tiktok")
    #[serde(default = "default_author")]
    pub default_author: String,

    /// Title token used when the payload has no title (default: "video")
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Maximum number of title characters kept in filenames (default: 50)
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Timeout for the metadata request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            hd: true,
            default_author: default_author(),
            default_title: default_title(),
            title_max_chars: default_title_max_chars(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// External downloader (yt-dlp) settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Output filename template handed to yt-dlp
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Additional arguments inserted before the URL
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            output_template: default_output_template(),
            extra_args: Vec::new(),
        }
    }
}

/// HTTP client settings for media transfers
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferConfig {
    /// TCP connect timeout (default: 30 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for BatchDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) — directory, URL filter, pacing, timeouts
/// - [`api`](ApiConfig) — metadata endpoint and filename hints
/// - [`tool`](ToolConfig) — yt-dlp binary and arguments
/// - [`transfer`](TransferConfig) — HTTP client for media bytes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batch behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Direct API strategy settings
    #[serde(default)]
    pub api: ApiConfig,

    /// External tool strategy settings
    #[serde(default)]
    pub tool: ToolConfig,

    /// Media transfer settings
    #[serde(default)]
    pub transfer: TransferConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields take their defaults, so `{}` is a valid file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.download.url_filter.trim().is_empty() {
            return Err(Error::config(
                "download.url_filter",
                "URL filter must not be empty",
            ));
        }
        if self.download.extension.trim().is_empty() {
            return Err(Error::config(
                "download.extension",
                "file extension must not be empty",
            ));
        }
        if self.api.endpoint.trim().is_empty() {
            return Err(Error::config(
                "api.endpoint",
                "metadata endpoint must not be empty",
            ));
        }
        if self.api.title_max_chars == 0 {
            return Err(Error::config(
                "api.title_max_chars",
                "title length limit must be at least 1",
            ));
        }
        if self.tool.output_template.trim().is_empty() {
            return Err(Error::config(
                "tool.output_template",
                "output template must not be empty",
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_download_dir() -> PathBuf {
    crate::utils::default_download_dir()
}

fn default_url_filter() -> String {
    "tiktok.com".to_string()
}

fn default_pacing_delay() -> Duration {
    Duration::from_millis(1100)
}

fn default_item_timeout() -> Option<Duration> {
    Some(Duration::from_secs(10 * 60))
}

fn default_extension() -> String {
    "mp4".to_string()
}

fn default_endpoint() -> String {
    "https://www.tikwm.com/api/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_author() -> String {
    "tiktok".to_string()
}

fn default_title() -> String {
    "video".to_string()
}

fn default_title_max_chars() -> usize {
    50
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_output_template() -> String {
    "%(title)s [%(id)s].%(ext)s".to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("tiktok-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper (milliseconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper (milliseconds)
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
