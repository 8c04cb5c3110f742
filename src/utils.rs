//! Utility functions for file operations and path manipulation

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Directory used when none is configured: `~/Downloads/tiktok videos`
///
/// Falls back to a relative `downloads/tiktok videos` when the home
/// directory cannot be determined.
pub fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("downloads"))
        .join("tiktok videos")
}

/// Get a path that does not collide with an existing file
///
/// Returns `path` unchanged when nothing exists there. Otherwise appends
/// ` (1)`, ` (2)`, … to the file stem until a free name is found.
///
/// # Examples
///
/// ```
/// use tiktok_dl::utils::get_unique_path;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/clip.mp4");
/// let unique = get_unique_path(path).unwrap();
/// // If /tmp/clip.mp4 exists, returns /tmp/clip (1).mp4
/// ```
pub fn get_unique_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
        Error::Io(std::io::Error::other(format!(
            "cannot extract file stem from {}",
            path.display()
        )))
    })?;

    let extension = path.extension().and_then(|e| e.to_str());

    let parent = path.parent().ok_or_else(|| {
        Error::Io(std::io::Error::other(format!(
            "cannot extract parent directory from {}",
            path.display()
        )))
    })?;

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let new_name = match extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        let new_path = parent.join(new_name);
        if !new_path.exists() {
            return Ok(new_path);
        }
    }

    Err(Error::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!(
            "could not find a unique filename for {} after {} attempts",
            path.display(),
            MAX_RENAME_ATTEMPTS
        ),
    )))
}

/// Create the download directory, including missing parents
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create directory '{}': {}", dir.display(), e),
        ))
    })
}
