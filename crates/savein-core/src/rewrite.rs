//! First-match-wins filename rewriting.

use serde::Serialize;

use crate::context::{DownloadContext, DownloadInfo};
use crate::rules::{MatchTarget, Rule};

/// Capture groups 1..n of a match; `None` for groups that did not participate.
pub type Captures = Vec<Option<String>>;

/// Outcome of one rewrite call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteResult {
    /// Rewritten filename, or the original (empty if there was none).
    pub filename: String,
    pub matched_rule: Option<Rule>,
    /// Present only when a rule matched and its matcher has groups.
    pub captures: Option<Captures>,
}

/// The text a matcher runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject<'a> {
    /// Only the matched span of a filename is replaced.
    Filename(&'a str),
    /// The expanded replacement becomes the whole filename.
    Other(&'a str),
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn subject_for(target: MatchTarget, ctx: &DownloadContext) -> Option<Subject<'_>> {
    let info = &ctx.info;
    match target {
        MatchTarget::Auto => non_empty(ctx.filename.as_deref())
            .map(Subject::Filename)
            .or_else(|| non_empty(Some(ctx.url.as_str())).map(Subject::Other))
            .or_else(|| info.match_text().map(Subject::Other)),
        MatchTarget::Filename => non_empty(ctx.filename.as_deref()).map(Subject::Filename),
        MatchTarget::Url => non_empty(Some(ctx.url.as_str())).map(Subject::Other),
        MatchTarget::Page => non_empty(info.page_url.as_deref()).map(Subject::Other),
        MatchTarget::Link => non_empty(info.link_url.as_deref()).map(Subject::Other),
        MatchTarget::Selection => non_empty(info.selection_text.as_deref()).map(Subject::Other),
        MatchTarget::Title => non_empty(ctx.tab_title.as_deref()).map(Subject::Other),
    }
}

fn collect_captures(caps: &regex::Captures<'_>) -> Captures {
    caps.iter()
        .skip(1)
        .map(|m| m.map(|m| m.as_str().to_string()))
        .collect()
}

/// Single-rule probe. Returns the groups if `rule` matches, `None` otherwise.
///
/// `filename_or_url` stands in for the filename and URL targets; the other
/// targets read from `info`. Rules targeting the tab title never match here.
/// Pure: safe to call speculatively, e.g. to preview the last download.
pub fn get_capture_matches(
    rule: &Rule,
    info: &DownloadInfo,
    filename_or_url: &str,
) -> Option<Captures> {
    let subject = match rule.target {
        MatchTarget::Auto | MatchTarget::Filename | MatchTarget::Url => {
            non_empty(Some(filename_or_url)).or_else(|| info.match_text())
        }
        MatchTarget::Page => non_empty(info.page_url.as_deref()),
        MatchTarget::Link => non_empty(info.link_url.as_deref()),
        MatchTarget::Selection => non_empty(info.selection_text.as_deref()),
        MatchTarget::Title => None,
    }?;
    rule.matcher
        .captures(subject)
        .map(|caps| collect_captures(&caps))
}

/// Rewrites the download's filename with the first matching rule.
///
/// Rules after the first match are not evaluated. With no match the original
/// filename is returned unchanged.
pub fn rewrite_filename(rules: &[Rule], ctx: &DownloadContext) -> RewriteResult {
    for rule in rules {
        let Some(subject) = subject_for(rule.target, ctx) else {
            continue;
        };
        let text = match subject {
            Subject::Filename(t) | Subject::Other(t) => t,
        };
        let Some(caps) = rule.matcher.captures(text) else {
            continue;
        };

        let expanded = rule.expand(&caps);
        let filename = match (subject, caps.get(0)) {
            (Subject::Filename(name), Some(whole)) => {
                format!("{}{}{}", &name[..whole.start()], expanded, &name[whole.end()..])
            }
            _ => expanded,
        };
        let captures = Some(collect_captures(&caps)).filter(|c| !c.is_empty());

        tracing::debug!(
            rule = rule.order,
            line = rule.line,
            target = rule.target.keyword(),
            %filename,
            "filename rule matched"
        );
        return RewriteResult {
            filename,
            matched_rule: Some(rule.clone()),
            captures,
        };
    }

    RewriteResult {
        filename: ctx.filename.clone().unwrap_or_default(),
        matched_rule: None,
        captures: None,
    }
}
