//! "Save as shortcut": small redirect files saved instead of the resource.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::context::{DownloadInfo, DownloadType};
use crate::sanitize::sanitize_filename;
use crate::url_parts::filename_from_url_path;

/// Name used when nothing better is known.
const DEFAULT_SHORTCUT_NAME: &str = "shortcut";

/// On-disk format of a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutType {
    /// HTML page with a meta refresh.
    #[default]
    Html,
    /// Windows `.url` InternetShortcut.
    Windows,
    /// macOS `.webloc` property list.
    Mac,
    /// freedesktop.org `.desktop` link.
    Freedesktop,
}

impl ShortcutType {
    pub fn extension(self) -> &'static str {
        match self {
            ShortcutType::Html => ".html",
            ShortcutType::Windows => ".url",
            ShortcutType::Mac => ".webloc",
            ShortcutType::Freedesktop => ".desktop",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ShortcutType::Html => "text/html;charset=utf-8",
            ShortcutType::Windows => "application/internet-shortcut",
            ShortcutType::Mac => "application/x-apple-plist",
            ShortcutType::Freedesktop => "application/x-desktop",
        }
    }
}

impl std::str::FromStr for ShortcutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(ShortcutType::Html),
            "windows" | "url" => Ok(ShortcutType::Windows),
            "mac" | "webloc" => Ok(ShortcutType::Mac),
            "freedesktop" | "desktop" => Ok(ShortcutType::Freedesktop),
            other => Err(format!("unknown shortcut type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutArtifact {
    pub shortcut_type: ShortcutType,
    pub body: String,
}

impl ShortcutArtifact {
    /// `data:` URL handed to the host in place of the original resource.
    pub fn content_url(&self) -> String {
        data_url(self.shortcut_type.mime(), &self.body)
    }
}

/// Base64 `data:` URL for an in-memory payload.
pub fn data_url(mime: &str, body: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(body.as_bytes()))
}

fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// INI-style formats end a value at a line break.
fn single_line(text: &str) -> String {
    text.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// Builds the redirect file pointing at `target_url`.
pub fn make_shortcut(shortcut_type: ShortcutType, target_url: &str) -> ShortcutArtifact {
    let body = match shortcut_type {
        ShortcutType::Html => {
            let url = escape_markup(target_url);
            format!(
                "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
                 <meta http-equiv=\"refresh\" content=\"0; url={url}\">\n\
                 <title>{url}</title>\n</head>\n<body>\n<a href=\"{url}\">{url}</a>\n</body>\n</html>\n"
            )
        }
        ShortcutType::Windows => format!("[InternetShortcut]\r\nURL={}\r\n", single_line(target_url)),
        ShortcutType::Mac => format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
             <plist version=\"1.0\">\n<dict>\n<key>URL</key>\n<string>{}</string>\n</dict>\n</plist>\n",
            escape_markup(target_url)
        ),
        ShortcutType::Freedesktop => {
            let url = single_line(target_url);
            format!("[Desktop Entry]\nEncoding=UTF-8\nName={url}\nType=Link\nURL={url}\nIcon=text-html\n")
        }
    };
    ShortcutArtifact {
        shortcut_type,
        body,
    }
}

/// Suggests a filename for a shortcut.
///
/// Prefers the tab title, then the link text, then `fallback_name`, then the
/// last segment of the saved URL.
/// The extension is appended before sanitizing so truncation keeps it.
pub fn suggest_shortcut_filename(
    shortcut_type: ShortcutType,
    download_type: DownloadType,
    info: &DownloadInfo,
    tab_title: Option<&str>,
    fallback_name: Option<&str>,
    truncate_length: usize,
    replacement: &str,
) -> String {
    let saved_url = match download_type {
        DownloadType::Link => info.link_url.as_deref(),
        DownloadType::Page => info.page_url.as_deref(),
        _ => info.src_url.as_deref(),
    };
    let from_url = saved_url.and_then(filename_from_url_path);

    let name = [tab_title, info.link_text.as_deref(), fallback_name, from_url.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(DEFAULT_SHORTCUT_NAME);

    let suggested = sanitize_filename(
        &format!("{name}{}", shortcut_type.extension()),
        truncate_length,
        replacement,
    );
    if suggested == shortcut_type.extension().trim_start_matches('.') {
        // Everything but the extension was stripped.
        format!("{DEFAULT_SHORTCUT_NAME}{}", shortcut_type.extension())
    } else {
        suggested
    }
}
