//! Final relative path handed to the host download call.

use crate::error::PathConfigError;
use crate::sanitize::{check_escape, sanitize_filename, sanitize_path};

/// Joins a resolved destination with a rewritten filename.
///
/// - Rejects a destination that escapes the download directory
/// - Drops empty and `.` segments, sanitizes the rest
/// - A `/` in the filename (from a rule) adds subfolders; the last segment
///   is sanitized as a filename and truncated to `truncate_length`
/// - An empty filename yields just the directory: the host picks the name
///
/// The output never fails [`check_escape`].
pub fn assemble(
    resolved_dir: &str,
    rewritten_filename: &str,
    truncate_length: usize,
    replacement: &str,
) -> Result<String, PathConfigError> {
    check_escape(resolved_dir)?;

    let normalized = rewritten_filename.replace('\\', "/");
    let (sub_dir, name) = normalized.rsplit_once('/').unwrap_or(("", normalized.as_str()));

    let mut segments: Vec<String> = Vec::new();
    for dir in [resolved_dir, sub_dir] {
        let clean = sanitize_path(dir, replacement);
        segments.extend(clean.split('/').filter(|s| !s.is_empty()).map(str::to_string));
    }
    let name = sanitize_filename(name, truncate_length, replacement);
    if !name.is_empty() {
        segments.push(name);
    }

    let path = segments.join("/");
    check_escape(&path)?;
    Ok(path)
}
