//! Filename derivation for videos saved by the Direct API strategy
//!
//! Names take the form `{author} - {title} - {millis}.{ext}`. The title is cut
//! to a character limit and stripped of characters that are unsafe on common
//! filesystems; the millisecond timestamp keeps names distinct across items.

/// Characters removed from titles before they become part of a filename
pub const UNSAFE_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Inputs for [`build_filename`]
#[derive(Debug, Clone, Copy)]
pub struct FilenameParts<'a> {
    /// Author identifier from the payload, if present
    pub author: Option<&'a str>,
    /// Title from the payload, if present
    pub title: Option<&'a str>,
    /// Author token used when `author` is absent
    pub default_author: &'a str,
    /// Title token used when `title` is absent
    pub default_title: &'a str,
    /// Maximum number of title characters kept
    pub title_max_chars: usize,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// File extension without the dot
    pub extension: &'a str,
}

/// Truncate a title to `max_chars` characters, then strip unsafe characters
///
/// Truncation counts characters, not bytes, so multi-byte titles are never
/// split inside a code point. The result is never longer than `max_chars`.
pub fn sanitize_title(title: &str, max_chars: usize) -> String {
    title
        .chars()
        .take(max_chars)
        .filter(|c| !UNSAFE_FILENAME_CHARS.contains(c))
        .collect()
}

fn strip_unsafe(token: &str) -> String {
    token
        .chars()
        .filter(|c| !UNSAFE_FILENAME_CHARS.contains(c))
        .collect()
}

/// Build the destination filename for one video
pub fn build_filename(parts: FilenameParts<'_>) -> String {
    let author = parts
        .author
        .map(strip_unsafe)
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| parts.default_author.to_string());

    let title = parts
        .title
        .map(|t| sanitize_title(t, parts.title_max_chars))
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| parts.default_title.to_string());

    format!(
        "{} - {} - {}.{}",
        author, title, parts.timestamp_ms, parts.extension
    )
}
