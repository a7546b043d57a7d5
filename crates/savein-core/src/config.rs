use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::DownloadType;
use crate::sanitize::{clean_replacement, NAME_MAX};
use crate::shortcut::ShortcutType;

/// Default filename length limit (characters).
pub const DEFAULT_TRUNCATE_LENGTH: usize = 240;

/// What the host does when the target file already exists. Passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    #[default]
    Uniquify,
    Overwrite,
    Prompt,
}

/// Every recognized option, loaded from `~/.config/savein/config.toml`.
///
/// Missing keys take their defaults, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveInConfig {
    /// Extra diagnostics in the log.
    pub debug: bool,
    pub conflict_action: ConflictAction,
    /// Offer the menu on links.
    pub links: bool,
    /// Offer the menu on text selections.
    pub selection: bool,
    /// Offer the menu on pages.
    pub page: bool,
    /// Always show the host's save-as dialog.
    pub prompt: bool,
    pub prompt_on_failure: bool,
    pub prompt_if_no_extension: bool,
    /// Destination list, one template per line.
    pub paths: String,
    /// Rule text, one rule per line.
    pub filename_patterns: String,
    pub route_failure_prompt: bool,
    /// Only offer a single "save" entry routed by rules into the root.
    pub route_exclusive: bool,
    pub shortcut_media: bool,
    pub shortcut_link: bool,
    pub shortcut_page: bool,
    pub shortcut_type: ShortcutType,
    pub notify_on_success: bool,
    pub notify_on_rule_match: bool,
    pub notify_on_failure: bool,
    pub notify_duration_ms: u64,
    /// Maximum filename length in characters.
    pub truncate_length: usize,
    /// Replaces filesystem-illegal characters; empty deletes them.
    pub replacement_char: String,
    pub key_root: String,
    pub key_last_used: String,
    pub enable_numbered_items: bool,
    pub content_click_to_save: bool,
    pub content_click_to_save_combo: u32,
}

impl Default for SaveInConfig {
    fn default() -> Self {
        Self {
            debug: false,
            conflict_action: ConflictAction::Uniquify,
            links: true,
            selection: true,
            page: true,
            prompt: false,
            prompt_on_failure: true,
            prompt_if_no_extension: false,
            paths: ".\nimages\nvideos".to_string(),
            filename_patterns: String::new(),
            route_failure_prompt: false,
            route_exclusive: false,
            shortcut_media: false,
            shortcut_link: false,
            shortcut_page: false,
            shortcut_type: ShortcutType::Html,
            notify_on_success: false,
            notify_on_rule_match: true,
            notify_on_failure: true,
            notify_duration_ms: 7000,
            truncate_length: DEFAULT_TRUNCATE_LENGTH,
            replacement_char: "_".to_string(),
            key_root: "a".to_string(),
            key_last_used: "a".to_string(),
            enable_numbered_items: true,
            content_click_to_save: false,
            content_click_to_save_combo: 18,
        }
    }
}

impl SaveInConfig {
    /// Normalizes values once at load time so later reads need no checks.
    ///
    /// - `replacement_char` loses illegal characters and leading dots
    /// - `truncate_length` of 0 becomes the default; larger than NAME_MAX is clamped
    pub fn validate(mut self) -> Self {
        let replacement = clean_replacement(&self.replacement_char);
        if replacement != self.replacement_char {
            tracing::warn!(
                configured = %self.replacement_char,
                using = %replacement,
                "replacement_char contained illegal characters"
            );
            self.replacement_char = replacement;
        }

        let truncate = match self.truncate_length {
            0 => DEFAULT_TRUNCATE_LENGTH,
            n => n.min(NAME_MAX),
        };
        if truncate != self.truncate_length {
            tracing::warn!(
                configured = self.truncate_length,
                using = truncate,
                "truncate_length out of range"
            );
            self.truncate_length = truncate;
        }
        self
    }

    /// Whether downloads of this type are saved as shortcuts.
    pub fn shortcut_for(&self, download_type: DownloadType) -> bool {
        match download_type {
            DownloadType::Media => self.shortcut_media,
            DownloadType::Link => self.shortcut_link,
            DownloadType::Page => self.shortcut_page,
            DownloadType::Selection | DownloadType::Unknown => false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("savein")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SaveInConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SaveInConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<SaveInConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: SaveInConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg.validate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_values() {
        let cfg = SaveInConfig::default();
        assert_eq!(cfg.conflict_action, ConflictAction::Uniquify);
        assert_eq!(cfg.paths, ".\nimages\nvideos");
        assert_eq!(cfg.truncate_length, 240);
        assert_eq!(cfg.replacement_char, "_");
        assert_eq!(cfg.shortcut_type, ShortcutType::Html);
        assert!(cfg.links && cfg.selection && cfg.page);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SaveInConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SaveInConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let toml = r#"
            conflict_action = "overwrite"
            shortcut_type = "freedesktop"
            filename_patterns = '''
(\.jpe?g)$ -> .jpg
'''
        "#;
        let cfg: SaveInConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.conflict_action, ConflictAction::Overwrite);
        assert_eq!(cfg.shortcut_type, ShortcutType::Freedesktop);
        assert_eq!(cfg.filename_patterns.trim(), r"(\.jpe?g)$ -> .jpg");
        assert_eq!(cfg.paths, ".\nimages\nvideos");
        assert!(cfg.notify_on_rule_match);
    }

    #[test]
    fn validate_cleans_values() {
        let cfg = SaveInConfig {
            replacement_char: "./".to_string(),
            truncate_length: 0,
            ..Default::default()
        }
        .validate();
        assert_eq!(cfg.replacement_char, "");
        assert_eq!(cfg.truncate_length, DEFAULT_TRUNCATE_LENGTH);

        let cfg = SaveInConfig {
            truncate_length: 10_000,
            ..Default::default()
        }
        .validate();
        assert_eq!(cfg.truncate_length, NAME_MAX);
    }

    #[test]
    fn shortcut_flags_by_type() {
        let cfg = SaveInConfig {
            shortcut_link: true,
            ..Default::default()
        };
        assert!(cfg.shortcut_for(DownloadType::Link));
        assert!(!cfg.shortcut_for(DownloadType::Media));
        assert!(!cfg.shortcut_for(DownloadType::Selection));
    }

    #[test]
    fn load_from_path_validates() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"replacement_char = \"?-\"\ntruncate_length = 64\n")
            .unwrap();
        f.flush().unwrap();
        let cfg = load_from_path(f.path()).unwrap();
        assert_eq!(cfg.replacement_char, "-");
        assert_eq!(cfg.truncate_length, 64);
    }

    #[test]
    fn load_from_path_reports_bad_toml() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"links = \"not a bool\"\n").unwrap();
        f.flush().unwrap();
        assert!(load_from_path(f.path()).is_err());
    }
}
