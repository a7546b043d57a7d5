//! Filename rewrite rules parsed from user-authored text.
//!
//! Rule text format, version 1. One rule per line:
//!
//! ```text
//! // lines starting with two slashes are comments; blank lines are ignored
//! (\.jpe?g)$ -> .jpg
//! [url] ^https://cdn\.example\.com/(\w+)/.*\.(png)$ -> example/$1.$2
//! ```
//!
//! - The line is split at the **last** `->`. A replacement can never contain
//!   `>` (it is filesystem-reserved), so arrows inside the matcher are safe.
//! - The matcher is a regular expression (`regex` crate syntax).
//! - The replacement references groups as `$1` or `${1}`; `$$` is a literal
//!   dollar. `/` in a replacement routes into subfolders.
//! - An optional `[target]` prefix followed by whitespace picks what the
//!   matcher runs against: `filename`, `url`, `page`, `link`, `selection`,
//!   `title`. Without it the target is chosen automatically (filename, then
//!   URL, then selection/link/page text).

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};

use crate::error::{RuleSyntaxError, RuleSyntaxErrorKind};
use crate::sanitize::is_fs_bad_char;

pub const RULE_FORMAT_VERSION: u32 = 1;

const COMMENT_PREFIX: &str = "//";
const ARROW: &str = "->";
const MATCHER_SIZE_LIMIT: usize = 1 << 20;

/// Which field of a download a matcher runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTarget {
    #[default]
    Auto,
    Filename,
    Url,
    Page,
    Link,
    Selection,
    Title,
}

impl MatchTarget {
    pub fn keyword(self) -> &'static str {
        match self {
            MatchTarget::Auto => "auto",
            MatchTarget::Filename => "filename",
            MatchTarget::Url => "url",
            MatchTarget::Page => "page",
            MatchTarget::Link => "link",
            MatchTarget::Selection => "selection",
            MatchTarget::Title => "title",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        [
            MatchTarget::Auto,
            MatchTarget::Filename,
            MatchTarget::Url,
            MatchTarget::Page,
            MatchTarget::Link,
            MatchTarget::Selection,
            MatchTarget::Title,
        ]
        .into_iter()
        .find(|t| t.keyword().eq_ignore_ascii_case(keyword))
    }
}

/// A piece of a parsed replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TemplatePiece {
    Literal(String),
    Group(usize),
}

#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    #[serde(serialize_with = "serialize_regex")]
    pub matcher: Regex,
    pub replacement: String,
    pub target: MatchTarget,
    /// Position in the active rule list; lower wins.
    pub order: usize,
    /// 1-based line in the source text.
    pub line: usize,
    #[serde(skip)]
    template: Vec<TemplatePiece>,
}

fn serialize_regex<S: Serializer>(re: &Regex, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(re.as_str())
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.matcher.as_str() == other.matcher.as_str()
            && self.replacement == other.replacement
            && self.target == other.target
            && self.order == other.order
            && self.line == other.line
    }
}

impl Eq for Rule {}

impl Rule {
    /// Instantiates the replacement with `caps`. Groups that did not
    /// participate, or that the matcher does not have, become empty.
    pub fn expand(&self, caps: &regex::Captures<'_>) -> String {
        let mut out = String::new();
        for piece in &self.template {
            match piece {
                TemplatePiece::Literal(text) => out.push_str(text),
                TemplatePiece::Group(i) => {
                    if let Some(m) = caps.get(*i) {
                        out.push_str(m.as_str());
                    }
                }
            }
        }
        out
    }

    /// Highest group index the replacement references (0 if none).
    pub fn max_group_reference(&self) -> usize {
        self.template
            .iter()
            .filter_map(|p| match p {
                TemplatePiece::Group(i) => Some(*i),
                TemplatePiece::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Parses a replacement template into literal and group pieces.
pub(crate) fn parse_template(replacement: &str) -> Result<Vec<TemplatePiece>, RuleSyntaxErrorKind> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            if is_fs_bad_char(c) && c != '/' {
                return Err(RuleSyntaxErrorKind::InvalidReplacement(c));
            }
            literal.push(c);
            continue;
        }

        let group = match chars.peek().copied() {
            Some('$') => {
                chars.next();
                literal.push('$');
                continue;
            }
            Some('{') => {
                chars.next();
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        _ => return Err(RuleSyntaxErrorKind::MalformedReference),
                    }
                }
                digits
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                digits
            }
            _ => {
                literal.push('$');
                continue;
            }
        };

        let index = group
            .parse::<usize>()
            .map_err(|_| RuleSyntaxErrorKind::MalformedReference)?;
        if !literal.is_empty() {
            pieces.push(TemplatePiece::Literal(std::mem::take(&mut literal)));
        }
        pieces.push(TemplatePiece::Group(index));
    }

    if !literal.is_empty() {
        pieces.push(TemplatePiece::Literal(literal));
    }
    Ok(pieces)
}

/// Splits an optional `[target]` prefix off a rule line.
fn split_target(text: &str) -> Result<(MatchTarget, &str), RuleSyntaxErrorKind> {
    let prefix = text.strip_prefix('[').and_then(|rest| {
        let end = rest.find(']')?;
        let keyword = &rest[..end];
        let after = &rest[end + 1..];
        let is_keyword = !keyword.is_empty() && keyword.chars().all(|c| c.is_ascii_alphabetic());
        (is_keyword && after.starts_with(char::is_whitespace)).then_some((keyword, after))
    });

    match prefix {
        Some((keyword, after)) => MatchTarget::from_keyword(keyword)
            .map(|target| (target, after.trim_start()))
            .ok_or_else(|| RuleSyntaxErrorKind::UnknownTarget(keyword.to_string())),
        None => Ok((MatchTarget::Auto, text)),
    }
}

/// Parses one line. Returns `None` for blank and comment lines.
///
/// The returned rule has `order` 0; [`parse_rules`] assigns positions.
pub fn parse_rule_line(line: usize, text: &str) -> Option<Result<Rule, RuleSyntaxError>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with(COMMENT_PREFIX) {
        return None;
    }
    let error = |kind| RuleSyntaxError {
        line,
        text: text.to_string(),
        kind,
    };
    Some(build_rule(line, text).map_err(error))
}

fn build_rule(line: usize, text: &str) -> Result<Rule, RuleSyntaxErrorKind> {
    let (target, rest) = split_target(text)?;
    let (matcher, replacement) = rest
        .rsplit_once(ARROW)
        .ok_or(RuleSyntaxErrorKind::MissingArrow)?;
    let (matcher, replacement) = (matcher.trim(), replacement.trim());
    if matcher.is_empty() {
        return Err(RuleSyntaxErrorKind::EmptyMatcher);
    }

    let regex = RegexBuilder::new(matcher)
        .size_limit(MATCHER_SIZE_LIMIT)
        .build()
        .map_err(|e| RuleSyntaxErrorKind::InvalidMatcher(e.to_string()))?;
    let template = parse_template(replacement)?;

    let rule = Rule {
        matcher: regex,
        replacement: replacement.to_string(),
        target,
        order: 0,
        line,
        template,
    };

    let groups = rule.matcher.captures_len() - 1;
    if rule.max_group_reference() > groups {
        tracing::debug!(
            line,
            groups,
            referenced = rule.max_group_reference(),
            "replacement references a group the matcher does not have; it will expand empty"
        );
    }
    Ok(rule)
}

/// Active rules in priority order plus the lines that were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRules {
    pub rules: Vec<Rule>,
    pub errors: Vec<RuleSyntaxError>,
}

/// Parses a whole rule text. Never fails: bad lines land in `errors`.
pub fn parse_rules(text: &str) -> ParsedRules {
    let parsed = text
        .lines()
        .enumerate()
        .filter_map(|(i, line)| parse_rule_line(i + 1, line))
        .fold(ParsedRules::default(), |mut acc, result| {
            match result {
                Ok(mut rule) => {
                    rule.order = acc.rules.len();
                    acc.rules.push(rule);
                }
                Err(e) => acc.errors.push(e),
            }
            acc
        });

    tracing::debug!(
        rules = parsed.rules.len(),
        errors = parsed.errors.len(),
        "parsed filename rules"
    );
    parsed
}
