//! Parser for yt-dlp console output

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Name reported when the output mentions no file
pub const FALLBACK_FILENAME: &str = "video.mp4";

static MERGER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r#"(?m)^\[Merger\] Merging formats into "(?:.*[/\\])?([^/\\"\n]+)"\s*$"#)
});

static DESTINATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)Destination:.*[/\\]([^/\\\r\n]+?)\s*$"));

static DOWNLOAD_MP4: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"\[download\].*[/\\]([^/\\\r\n]+\.mp4)"));

/// Build one output pattern, logging (and skipping) it if it does not compile
fn compile(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .size_limit(1024 * 1024)
        .build()
        .map_err(|e| {
            tracing::error!(pattern, error = %e, "invalid yt-dlp output pattern");
        })
        .ok()
}

/// Extract the name of the file yt-dlp wrote from its combined output
///
/// Patterns are tried in order:
/// 1. `[Merger] Merging formats into ".../name.ext"`
/// 2. `Destination: .../name.ext`
/// 3. `[download] .../name.mp4` (also matches "has already been downloaded")
///
/// Both `/` and `\` are accepted as path separators. Returns `None` when no
/// pattern matches.
pub fn extract_filename(output: &str) -> Option<String> {
    [&*MERGER, &*DESTINATION, &*DOWNLOAD_MP4]
        .into_iter()
        .flatten()
        .find_map(|re| re.captures(output))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
