//! Validation issues and the aggregated [`ValidationError`].
//!
//! Every failing field produces one [`ValidationIssue`]; binding collects all
//! of them before rejecting a request, so a client sees every problem at once.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// One step of a field path: an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for LocSegment {
    fn from(key: &str) -> Self {
        LocSegment::Key(key.to_string())
    }
}

impl From<String> for LocSegment {
    fn from(key: String) -> Self {
        LocSegment::Key(key)
    }
}

impl From<usize> for LocSegment {
    fn from(idx: usize) -> Self {
        LocSegment::Index(idx)
    }
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocSegment::Key(k) => f.write_str(k),
            LocSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// The constraint or rule a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    JsonInvalid,
    StringType,
    IntParsing,
    IntFromFloat,
    FloatParsing,
    BoolParsing,
    UuidParsing,
    DatetimeParsing,
    TimeParsing,
    TimeDeltaParsing,
    UrlParsing,
    UrlScheme,
    Enum,
    ModelAttributesType,
    ListType,
    DictType,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    StringTooShort,
    StringTooLong,
    TooShort,
    TooLong,
    StringPatternMismatch,
}

impl IssueKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Missing => "missing",
            IssueKind::JsonInvalid => "json_invalid",
            IssueKind::StringType => "string_type",
            IssueKind::IntParsing => "int_parsing",
            IssueKind::IntFromFloat => "int_from_float",
            IssueKind::FloatParsing => "float_parsing",
            IssueKind::BoolParsing => "bool_parsing",
            IssueKind::UuidParsing => "uuid_parsing",
            IssueKind::DatetimeParsing => "datetime_parsing",
            IssueKind::TimeParsing => "time_parsing",
            IssueKind::TimeDeltaParsing => "time_delta_parsing",
            IssueKind::UrlParsing => "url_parsing",
            IssueKind::UrlScheme => "url_scheme",
            IssueKind::Enum => "enum",
            IssueKind::ModelAttributesType => "model_attributes_type",
            IssueKind::ListType => "list_type",
            IssueKind::DictType => "dict_type",
            IssueKind::GreaterThan => "greater_than",
            IssueKind::GreaterThanEqual => "greater_than_equal",
            IssueKind::LessThan => "less_than",
            IssueKind::LessThanEqual => "less_than_equal",
            IssueKind::StringTooShort => "string_too_short",
            IssueKind::StringTooLong => "string_too_long",
            IssueKind::TooShort => "too_short",
            IssueKind::TooLong => "too_long",
            IssueKind::StringPatternMismatch => "string_pattern_mismatch",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Field path, starting with the origin (`path`, `query`, `body`, `cookie`).
    pub loc: Vec<LocSegment>,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub msg: String,
    /// The raw offending value (`null` when missing).
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Value>,
}

impl ValidationIssue {
    pub fn new(
        loc: Vec<LocSegment>,
        kind: IssueKind,
        msg: impl Into<String>,
        input: Value,
    ) -> Self {
        ValidationIssue {
            loc,
            kind,
            msg: msg.into(),
            input,
            ctx: None,
        }
    }

    #[must_use]
    pub fn with_ctx(mut self, ctx: Value) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// `query.needy`, `body.item.tags.0`
    #[must_use]
    pub fn location(&self) -> String {
        self.loc
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location(), self.msg)
    }
}

/// Every issue found while binding one request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} validation error(s): {}", .issues.len(), summary(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn summary(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    #[must_use]
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// `{"detail": [issue, ...]}`
    #[must_use]
    pub fn to_body(&self) -> Value {
        json!({ "detail": self.issues })
    }

    /// Issues whose location starts with the given segments.
    pub fn issues_at<'a>(
        &'a self,
        prefix: &'a [&'a str],
    ) -> impl Iterator<Item = &'a ValidationIssue> + 'a {
        self.issues.iter().filter(move |issue| {
            prefix.len() <= issue.loc.len()
                && prefix
                    .iter()
                    .zip(&issue.loc)
                    .all(|(p, seg)| matches!(seg, LocSegment::Key(k) if k == p))
        })
    }
}
