//! The user's destination list: one path template per line.
//!
//! ```text
//! // comments and blank lines are skipped
//! .
//! images/:sourcedomain:
//! :separator:
//! videos
//! ```

use std::collections::HashSet;

use crate::error::PathConfigError;
use crate::sanitize::{check_escape, sanitize_path};
use crate::special_dirs::{remove_special_dirs, PathTemplate, SpecialDir};

const COMMENT_PREFIX: &str = "//";
const MENU_ID_PREFIX: &str = "save-in-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub template: PathTemplate,
    /// Context-menu id: `save-in-<raw path>`.
    pub menu_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Separator,
    Path(Destination),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDestinations {
    pub entries: Vec<MenuEntry>,
    pub errors: Vec<PathConfigError>,
}

impl ParsedDestinations {
    pub fn destinations(&self) -> impl Iterator<Item = &Destination> {
        self.entries.iter().filter_map(|e| match e {
            MenuEntry::Path(d) => Some(d),
            MenuEntry::Separator => None,
        })
    }

    pub fn find_by_menu_id(&self, menu_id: &str) -> Option<&Destination> {
        self.destinations().find(|d| d.menu_id == menu_id)
    }
}

/// Checks one destination line before any token is expanded.
pub fn validate_destination(line: &str, replacement: &str) -> Result<(), PathConfigError> {
    check_escape(line)?;

    let literal = remove_special_dirs(line.strip_prefix("./").unwrap_or(line));
    if literal == "." {
        return Ok(());
    }
    let normalized = literal
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if sanitize_path(&literal, replacement) != normalized {
        return Err(PathConfigError::InvalidCharacters {
            path: line.to_string(),
        });
    }
    Ok(())
}

/// Parses the destination list. Never fails: bad lines land in `errors` and
/// get no menu entry.
pub fn parse_destinations(paths_text: &str, replacement: &str) -> ParsedDestinations {
    let separator = SpecialDir::Separator.token();
    let mut seen = HashSet::new();
    let mut parsed = ParsedDestinations::default();

    for line in paths_text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        if line == separator {
            parsed.entries.push(MenuEntry::Separator);
            continue;
        }
        if !seen.insert(line) {
            continue;
        }
        match validate_destination(line, replacement) {
            Ok(()) => parsed.entries.push(MenuEntry::Path(Destination {
                template: PathTemplate::parse(line),
                menu_id: format!("{MENU_ID_PREFIX}{line}"),
            })),
            Err(e) => {
                tracing::warn!(path = line, "skipping destination: {}", e);
                parsed.errors.push(e);
            }
        }
    }

    tracing::debug!(
        destinations = parsed.destinations().count(),
        errors = parsed.errors.len(),
        "parsed destinations"
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raws(parsed: &ParsedDestinations) -> Vec<&str> {
        parsed.destinations().map(|d| d.template.raw()).collect()
    }

    #[test]
    fn default_paths() {
        let parsed = parse_destinations(".\nimages\nvideos", "_");
        assert!(parsed.errors.is_empty());
        assert_eq!(raws(&parsed), vec![".", "images", "videos"]);
        assert_eq!(
            parsed.find_by_menu_id("save-in-images").map(|d| d.template.raw()),
            Some("images")
        );
    }

    #[test]
    fn separators_repeat_and_paths_dedupe() {
        let parsed = parse_destinations("a\n:separator:\na\n  :separator:  \nb", "_");
        assert_eq!(parsed.entries.len(), 4);
        assert_eq!(parsed.entries[1], MenuEntry::Separator);
        assert_eq!(parsed.entries[2], MenuEntry::Separator);
        assert_eq!(raws(&parsed), vec!["a", "b"]);
    }

    #[test]
    fn skips_blank_and_comment_lines_silently() {
        let parsed = parse_destinations("\n// note\n   \nimages", "_");
        assert!(parsed.errors.is_empty());
        assert_eq!(raws(&parsed), vec!["images"]);
    }

    #[test]
    fn rejects_escaping_paths() {
        let parsed = parse_destinations("..\n../up\n/abs\nimages//x\nok", "_");
        assert_eq!(raws(&parsed), vec!["ok"]);
        assert_eq!(parsed.errors.len(), 4);
        assert_eq!(parsed.errors[3].path(), "images//x");
        assert!(parsed
            .errors
            .iter()
            .all(|e| matches!(e, PathConfigError::Escapes { .. })));
    }

    #[test]
    fn rejects_invalid_characters() {
        let parsed = parse_destinations("what?\n.hidden\nfine/:date:\n./rel\ntrailing/", "_");
        assert_eq!(raws(&parsed), vec!["fine/:date:", "./rel", "trailing/"]);
        assert_eq!(
            parsed.errors,
            vec![
                PathConfigError::InvalidCharacters {
                    path: "what?".to_string()
                },
                PathConfigError::InvalidCharacters {
                    path: ".hidden".to_string()
                },
            ]
        );
    }

    #[test]
    fn tokens_are_not_invalid_characters() {
        assert!(validate_destination(":sourcedomain:/:year:/:month:", "_").is_ok());
        assert!(validate_destination("a/:unknown:", "_").is_err());
    }
}
