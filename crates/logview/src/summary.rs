//! Collapsed-row summaries for raw JSONL lines.
//!
//! The raw view shows one row per line; parsing every line as JSON just to
//! render a badge would dominate scroll cost, so the summary fields are
//! pulled out with plain regex matches over the raw text.

use chrono::DateTime;
use regex::Regex;
use std::sync::LazyLock;

static TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""type"\s*:\s*"([^"]*)""#).unwrap());
static UUID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""uuid"\s*:\s*"([^"]*)""#).unwrap());
static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""timestamp"\s*:\s*"([^"]*)""#).unwrap());

/// Badge classification for a raw record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Assistant,
    System,
    Progress,
    Other,
}

impl RecordKind {
    fn from_type(raw: &str) -> Self {
        match raw {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "system" => Self::System,
            "progress" => Self::Progress,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Progress => "progress",
            Self::Other => "other",
        }
    }
}

/// Summary fields extracted from one raw line. Missing fields come back
/// empty; a line that is not JSON at all still summarizes (as `Other`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSummary {
    pub kind: RecordKind,
    pub raw_kind: String,
    pub id: String,
    pub timestamp: String,
}

pub fn summarize(raw: &str) -> LineSummary {
    let raw_kind = capture(&TYPE_RE, raw);
    LineSummary {
        kind: RecordKind::from_type(&raw_kind),
        raw_kind,
        id: capture(&UUID_RE, raw),
        timestamp: capture(&TIMESTAMP_RE, raw),
    }
}

fn capture(re: &Regex, raw: &str) -> String {
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Clock-time rendering of an ISO 8601 timestamp; unparseable input is
/// returned as-is.
pub fn format_clock_time(timestamp: &str) -> String {
    if timestamp.is_empty() {
        return String::new();
    }
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.format("%H:%M:%S").to_string(),
        Err(_) => timestamp.to_string(),
    }
}
