//! Filesystem-safe path and filename segments.
//!
//! Everything here is pure and idempotent: running any function on its own
//! output returns the output unchanged.

use crate::error::PathConfigError;

/// Characters rejected by at least one common filesystem (Windows is the strictest).
const FS_BAD_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Linux NAME_MAX; filenames are never longer than this.
pub const NAME_MAX: usize = 255;

/// Replacement used for bad characters when none is configured.
pub const DEFAULT_REPLACEMENT: &str = "_";

/// True for NUL, control characters, path separators and reserved characters.
pub fn is_fs_bad_char(c: char) -> bool {
    c.is_control() || FS_BAD_CHARS.contains(&c)
}

/// Replaces every filesystem-illegal character with `replacement`.
///
/// An empty `replacement` deletes the characters.
pub fn replace_fs_bad_chars(text: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_fs_bad_char(c) {
            out.push_str(replacement);
        } else {
            out.push(c);
        }
    }
    out
}

/// Strips leading dots so a segment cannot turn into a hidden file (or `..`).
pub fn replace_leading_dots(text: &str) -> &str {
    text.trim_start_matches('.')
}

/// Cleans a configured replacement string so it can never itself be illegal.
pub fn clean_replacement(replacement: &str) -> String {
    replace_leading_dots(&replace_fs_bad_chars(replacement, "")).to_string()
}

/// Sanitizes a relative path segment by segment.
///
/// Splits on `/` and `\`, replaces bad characters and leading dots in each
/// segment, drops segments left empty and joins with `/`.
pub fn sanitize_path(text: &str, replacement: &str) -> String {
    let replacement = clean_replacement(replacement);
    text.split(['/', '\\'])
        .map(|segment| {
            let replaced = replace_fs_bad_chars(segment, &replacement);
            replace_leading_dots(&replaced).to_string()
        })
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Sanitizes a single filename.
///
/// - Replaces bad characters (including separators) with `replacement`
/// - Trims leading dots and whitespace, trailing dots and whitespace
/// - Truncates to `truncate_length` characters, keeping the extension
pub fn sanitize_filename(text: &str, truncate_length: usize, replacement: &str) -> String {
    let replacement = clean_replacement(replacement);
    let replaced = replace_fs_bad_chars(text, &replacement);
    let truncated = truncate_filename(trim_filename(&replaced), truncate_length);
    trim_filename(&truncated).to_string()
}

fn trim_filename(name: &str) -> &str {
    name.trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
}

/// Truncates `name` to at most `max_chars` characters.
///
/// When the name has an extension shorter than the limit, the stem is cut and
/// the extension kept: `truncate_filename("a-very-long-name.txt", 10)` is
/// `"a-very.txt"`.
pub fn truncate_filename(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    if let Some(dot) = name.rfind('.').filter(|&dot| dot > 0) {
        let ext = &name[dot..];
        let ext_len = ext.chars().count();
        if ext_len < max_chars {
            let stem: String = name[..dot].chars().take(max_chars - ext_len).collect();
            return format!("{stem}{ext}");
        }
    }
    name.chars().take(max_chars).collect()
}

/// Rejects destinations that would leave the download directory.
///
/// A path escapes if it is absolute (`/`, `\`, `C:`), has an empty segment
/// from a double separator (`a//b`), or contains a `..` segment anywhere.
/// A single trailing separator is allowed.
pub fn check_escape(path: &str) -> Result<(), PathConfigError> {
    let mut chars = path.chars();
    let absolute = path.starts_with(['/', '\\'])
        || matches!((chars.next(), chars.next()), (Some(d), Some(':')) if d.is_ascii_alphabetic());

    let segments: Vec<&str> = path.split(['/', '\\']).collect();
    let last = segments.len() - 1;
    let parent = segments.iter().any(|segment| segment.trim() == "..");
    let double_separator = segments[..last].iter().any(|segment| segment.is_empty());

    if absolute || parent || double_separator {
        return Err(PathConfigError::Escapes {
            path: path.to_string(),
        });
    }
    Ok(())
}
