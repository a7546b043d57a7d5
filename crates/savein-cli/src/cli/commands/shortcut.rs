//! `savein shortcut` – print a redirect file for a URL.

use anyhow::Result;
use savein_core::config::SaveInConfig;
use savein_core::context::{DownloadInfo, DownloadType};
use savein_core::shortcut::{make_shortcut, suggest_shortcut_filename, ShortcutType};

/// Writes the shortcut body to stdout and the suggested filename to stderr.
pub fn run_shortcut(
    cfg: &SaveInConfig,
    url: &str,
    shortcut_type: Option<ShortcutType>,
    title: Option<&str>,
) -> Result<()> {
    let kind = shortcut_type.unwrap_or(cfg.shortcut_type);
    let artifact = make_shortcut(kind, url);
    let info = DownloadInfo {
        link_url: Some(url.to_string()),
        ..Default::default()
    };
    let name = suggest_shortcut_filename(
        kind,
        DownloadType::Link,
        &info,
        title,
        None,
        cfg.truncate_length,
        &cfg.replacement_char,
    );
    eprintln!("suggested filename: {name}");
    print!("{}", artifact.body);
    Ok(())
}
