//! Collected (never thrown) error types for rule text and destination paths.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a rule line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSyntaxErrorKind {
    #[error("expected `<matcher> -> <replacement>`")]
    MissingArrow,
    #[error("matcher is empty")]
    EmptyMatcher,
    #[error("unknown match target `[{0}]`")]
    UnknownTarget(String),
    #[error("invalid matcher: {0}")]
    InvalidMatcher(String),
    #[error("replacement contains invalid character {0:?}")]
    InvalidReplacement(char),
    #[error("malformed capture reference in replacement")]
    MalformedReference,
}

/// A rule line that failed to parse. The line contributes no rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct RuleSyntaxError {
    /// 1-based line number in the rule text.
    pub line: usize,
    /// The offending line, trimmed.
    pub text: String,
    pub kind: RuleSyntaxErrorKind,
}

/// A destination that cannot be used. The corresponding menu entry is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathConfigError {
    #[error("Path cannot start with .. or /")]
    Escapes { path: String },
    #[error("Path contains invalid characters")]
    InvalidCharacters { path: String },
}

impl PathConfigError {
    pub fn path(&self) -> &str {
        match self {
            PathConfigError::Escapes { path } | PathConfigError::InvalidCharacters { path } => path,
        }
    }
}

/// One diagnostics row: a human-readable message plus the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionError {
    pub message: String,
    pub error: String,
}

impl From<&RuleSyntaxError> for OptionError {
    fn from(e: &RuleSyntaxError) -> Self {
        Self {
            message: format!("line {}: {}", e.line, e.kind),
            error: e.text.clone(),
        }
    }
}

impl From<&PathConfigError> for OptionError {
    fn from(e: &PathConfigError) -> Self {
        Self {
            message: e.to_string(),
            error: e.path().to_string(),
        }
    }
}
