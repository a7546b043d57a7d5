//! Read-only snapshot of one save operation.
//!
//! Built once per user action and never mutated by the engine. The timestamp
//! is captured here so date tokens expand without reading the clock.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            other => Err(format!("unknown media type: {other}")),
        }
    }
}

/// What kind of thing the user asked to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadType {
    Media,
    Link,
    Selection,
    Page,
    #[default]
    Unknown,
}

impl DownloadType {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadType::Media => "media",
            DownloadType::Link => "link",
            DownloadType::Selection => "selection",
            DownloadType::Page => "page",
            DownloadType::Unknown => "unknown",
        }
    }
}

/// Context-menu click info as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadInfo {
    pub media_type: Option<MediaType>,
    pub src_url: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub page_url: Option<String>,
    pub selection_text: Option<String>,
}

impl DownloadInfo {
    /// Last-resort match text: selection, then link URL, then page URL.
    pub fn match_text(&self) -> Option<&str> {
        [&self.selection_text, &self.link_url, &self.page_url]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.is_empty())
    }
}

/// The browser tab owning the click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: i64,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadContext {
    /// Filename known before rewriting, if any.
    pub filename: Option<String>,
    /// URL being saved.
    pub url: String,
    pub info: DownloadInfo,
    pub tab_title: Option<String>,
    pub download_type: DownloadType,
    pub timestamp: DateTime<FixedOffset>,
}

impl DownloadContext {
    pub fn new(url: impl Into<String>, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            filename: None,
            url: url.into(),
            info: DownloadInfo::default(),
            tab_title: None,
            download_type: DownloadType::Unknown,
            timestamp,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_info(mut self, info: DownloadInfo) -> Self {
        self.info = info;
        self
    }

    pub fn with_tab_title(mut self, title: impl Into<String>) -> Self {
        self.tab_title = Some(title.into());
        self
    }

    pub fn with_download_type(mut self, download_type: DownloadType) -> Self {
        self.download_type = download_type;
        self
    }

    /// Filename if present, else the URL: the subject of the "test last download" probe.
    pub fn filename_or_url(&self) -> &str {
        self.filename
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn match_text_priority() {
        let mut info = DownloadInfo {
            page_url: Some("https://example.com/".to_string()),
            link_url: Some("https://example.com/a".to_string()),
            selection_text: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(info.match_text(), Some("https://example.com/a"));
        info.selection_text = Some("hello".to_string());
        assert_eq!(info.match_text(), Some("hello"));
    }

    #[test]
    fn filename_or_url_falls_back() {
        let ctx = DownloadContext::new("https://example.com/x.png", ts());
        assert_eq!(ctx.filename_or_url(), "https://example.com/x.png");
        let ctx = ctx.with_filename("x.png");
        assert_eq!(ctx.filename_or_url(), "x.png");
    }

    #[test]
    fn media_type_from_str() {
        assert_eq!("Image".parse::<MediaType>(), Ok(MediaType::Image));
        assert!("pdf".parse::<MediaType>().is_err());
    }
}
