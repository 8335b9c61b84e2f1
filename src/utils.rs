//! Text and filesystem helpers shared across the crate.
//!
//! - Whitespace normalization used by every extraction strategy
//! - Character-based length and truncation (feeds are rarely ASCII-only)
//! - Log-friendly truncation
//! - Data directory validation for the JSON store

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static INLINE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Collapse every run of whitespace, newlines included, to a single space.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_whitespace("  a \n\t b "), "a b");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").trim().to_string()
}

/// Collapse whitespace within each line and drop blank lines, keeping one
/// newline between the remaining lines.
pub fn normalize_text(s: &str) -> String {
    s.lines()
        .map(|line| INLINE_WHITESPACE_RUN.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Length in characters, which is what every extraction threshold counts.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `max` characters of `s`.
pub fn take_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let scratch_path = path.join("..__write_check__");
    stdfs::File::create(&scratch_path)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Data directory is writable");
    Ok(())
}
