use std::fmt::Display;

use serde_json::Value;
use thiserror::Error;

mod issues;
mod pull_request;

/// Value of the `X-GitHub-Event` header.
///
/// Only the kinds we know how to announce get their own variant, everything else is kept as-is so
/// it can still be matched against the configured interests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Issues,
    PullRequest,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Issues => "issues",
            Self::PullRequest => "pull_request",
            Self::Other(kind) => kind,
        }
    }
}

impl From<&str> for EventKind {
    fn from(kind: &str) -> Self {
        match kind {
            "issues" => Self::Issues,
            "pull_request" => Self::PullRequest,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("payload is missing field `{0}`")]
    MissingField(&'static str),
    #[error("payload field `{field}` should be a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Builds the sentence announcing an event.
///
/// `Ok(None)` means there is nothing to say about this event: either the kind isn't known, or the
/// action isn't one we announce.
pub fn render(kind: &EventKind, payload: &Value) -> Result<Option<String>, ReportError> {
    match kind {
        EventKind::Issues => issues::report(payload),
        EventKind::PullRequest => pull_request::report(payload),
        EventKind::Other(_) => Ok(None),
    }
}

/// Fields every announced event carries.
struct Common<'a> {
    user: &'a str,
    repo: &'a str,
}

impl<'a> Common<'a> {
    fn from_payload(payload: &'a Value) -> Result<Self, ReportError> {
        Ok(Self {
            user: str_field(payload, "/sender/login")?,
            repo: str_field(payload, "/repository/full_name")?,
        })
    }
}

fn field<'a>(payload: &'a Value, pointer: &'static str) -> Result<&'a Value, ReportError> {
    match payload.pointer(pointer) {
        Some(Value::Null) | None => Err(ReportError::MissingField(pointer)),
        Some(value) => Ok(value),
    }
}

fn str_field<'a>(payload: &'a Value, pointer: &'static str) -> Result<&'a str, ReportError> {
    field(payload, pointer)?
        .as_str()
        .ok_or(ReportError::WrongType {
            field: pointer,
            expected: "string",
        })
}

fn bool_field(payload: &Value, pointer: &'static str) -> Result<bool, ReportError> {
    field(payload, pointer)?
        .as_bool()
        .ok_or(ReportError::WrongType {
            field: pointer,
            expected: "boolean",
        })
}
