//! Symbolic `:token:` directories expanded against a download's context.
//!
//! The token set is closed. Anything between colons that is not a known token
//! is left as literal text. Expansion never reads the clock or the filesystem;
//! dates come from [`DownloadContext::timestamp`].

use crate::context::DownloadContext;
use crate::sanitize::{replace_fs_bad_chars, replace_leading_dots, DEFAULT_REPLACEMENT};
use crate::url_parts::domain_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialDir {
    /// Menu separator marker; expands to nothing.
    Separator,
    Date,
    Year,
    Month,
    Day,
    UnixDate,
    SourceDomain,
    PageDomain,
    PageTitle,
    DownloadType,
}

impl SpecialDir {
    pub const ALL: [SpecialDir; 10] = [
        SpecialDir::Separator,
        SpecialDir::Date,
        SpecialDir::Year,
        SpecialDir::Month,
        SpecialDir::Day,
        SpecialDir::UnixDate,
        SpecialDir::SourceDomain,
        SpecialDir::PageDomain,
        SpecialDir::PageTitle,
        SpecialDir::DownloadType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpecialDir::Separator => "separator",
            SpecialDir::Date => "date",
            SpecialDir::Year => "year",
            SpecialDir::Month => "month",
            SpecialDir::Day => "day",
            SpecialDir::UnixDate => "unixdate",
            SpecialDir::SourceDomain => "sourcedomain",
            SpecialDir::PageDomain => "pagedomain",
            SpecialDir::PageTitle => "pagetitle",
            SpecialDir::DownloadType => "downloadtype",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    /// The token as written in a template, e.g. `:date:`.
    pub fn token(self) -> String {
        format!(":{}:", self.name())
    }

    /// Value of the token for one download. Missing values are empty.
    pub fn resolve(self, url: &str, ctx: Option<&DownloadContext>) -> String {
        let raw = match (self, ctx) {
            (SpecialDir::Separator, _) => None,
            (SpecialDir::SourceDomain, _) => domain_of(url),
            (SpecialDir::Date, Some(c)) => Some(c.timestamp.format("%Y-%m-%d").to_string()),
            (SpecialDir::Year, Some(c)) => Some(c.timestamp.format("%Y").to_string()),
            (SpecialDir::Month, Some(c)) => Some(c.timestamp.format("%m").to_string()),
            (SpecialDir::Day, Some(c)) => Some(c.timestamp.format("%d").to_string()),
            (SpecialDir::UnixDate, Some(c)) => Some(c.timestamp.timestamp().to_string()),
            (SpecialDir::PageDomain, Some(c)) => c.info.page_url.as_deref().and_then(domain_of),
            (SpecialDir::PageTitle, Some(c)) => c.tab_title.clone(),
            (SpecialDir::DownloadType, Some(c)) => Some(c.download_type.as_str().to_string()),
            (_, None) => None,
        };
        raw.map(|v| clean_value(&v)).unwrap_or_default()
    }
}

/// A resolved value is a single segment: it may not carry separators.
fn clean_value(value: &str) -> String {
    let replaced = replace_fs_bad_chars(value.trim(), DEFAULT_REPLACEMENT);
    replace_leading_dots(&replaced).to_string()
}

fn expand_with(template: &str, mut f: impl FnMut(SpecialDir) -> String) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(':') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let token = after
            .find(':')
            .and_then(|end| SpecialDir::from_name(&after[..end]).map(|dir| (dir, end)));
        match token {
            Some((dir, end)) => {
                out.push_str(&f(dir));
                rest = &after[end + 1..];
            }
            None => {
                out.push(':');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Expands every known token in `template`.
pub fn replace_special_dirs(template: &str, url: &str, ctx: Option<&DownloadContext>) -> String {
    expand_with(template, |dir| dir.resolve(url, ctx))
}

/// Removes every known token, leaving only the literal text for validation.
pub fn remove_special_dirs(template: &str) -> String {
    expand_with(template, |_| String::new())
}

/// One `/`-separated piece of a destination template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Literal directory name, possibly with embedded tokens (`pics-:year:`).
    Text(String),
    /// A segment that is exactly one token.
    Token(SpecialDir),
}

impl PathSegment {
    fn parse(segment: &str) -> Self {
        segment
            .strip_prefix(':')
            .and_then(|s| s.strip_suffix(':'))
            .and_then(SpecialDir::from_name)
            .map(PathSegment::Token)
            .unwrap_or_else(|| PathSegment::Text(segment.to_string()))
    }

    fn resolve(&self, url: &str, ctx: Option<&DownloadContext>) -> String {
        match self {
            PathSegment::Text(text) => replace_special_dirs(text, url, ctx),
            PathSegment::Token(dir) => dir.resolve(url, ctx),
        }
    }
}

/// A destination as configured by the user, e.g. `images/:sourcedomain:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            segments: raw.split(['/', '\\']).map(PathSegment::parse).collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse(&segments.join("/"))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Expanded segments with empty and `.` segments collapsed away.
    pub fn resolve_segments(&self, url: &str, ctx: Option<&DownloadContext>) -> Vec<String> {
        self.segments
            .iter()
            .map(|s| s.resolve(url, ctx))
            .filter(|s| !s.is_empty() && s != ".")
            .collect()
    }

    /// Expanded path joined with `/`; `.` when nothing is left.
    pub fn resolve(&self, url: &str, ctx: Option<&DownloadContext>) -> String {
        let segments = self.resolve_segments(url, ctx);
        if segments.is_empty() {
            ".".to_string()
        } else {
            segments.join("/")
        }
    }
}
