//! Session data-source seam.
//!
//! The viewer core never talks to a wire protocol directly; it consumes a
//! [`SessionSource`] that answers a small set of queries: session listings,
//! paginated raw log lines, full raw log text, the parsed transcript, and the
//! tool-use → agent-id map. Implementations decide where the bytes come from
//! (the shipped one reads the local filesystem).

use crate::event::TranscriptEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one discovered session, cheap enough to compute for every
/// session in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub line_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default)]
    pub is_sidechain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

/// One raw log line. `line_number` is zero-based; display numbering is the
/// view's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    pub line_number: usize,
    pub content: String,
}

/// One page of raw log lines plus the file's fixed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub lines: Vec<LogLine>,
    pub total_lines: usize,
}

/// Pairing of a Task/Agent tool-use id with the subagent it spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMapping {
    pub tool_use_id: String,
    pub agent_id: String,
}

/// Failure surfaced by a [`SessionSource`] operation. Always a distinct
/// error, never a partial success; callers retry or degrade locally.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("session not found: {id}")]
    NotFound { id: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport error: {message}")]
    Transport { message: String },
    #[error("malformed session data: {message}")]
    Malformed { message: String },
}

/// Abstract provider of session data.
///
/// Page requests are parameterized by integer offset/limit and must report
/// the file's total line count alongside every page.
pub trait SessionSource {
    /// All discovered sessions, most recently updated first.
    fn list_sessions(
        &self,
    ) -> impl Future<Output = Result<Vec<SessionSummary>, SourceError>> + Send;

    /// Metadata for a single session.
    fn session_info(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<SessionSummary, SourceError>> + Send;

    /// A window of raw log lines `[offset, offset + limit)`.
    fn log_lines(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<LogPage, SourceError>> + Send;

    /// The complete raw log text (used for whole-file export, not by the
    /// windowed cache).
    fn raw_log(&self, id: &str) -> impl Future<Output = Result<String, SourceError>> + Send;

    /// The session's full transcript event list, in log order.
    fn transcript(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Vec<TranscriptEvent>, SourceError>> + Send;

    /// Tool-use id → subagent id pairs for the session.
    fn agent_map(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Vec<AgentMapping>, SourceError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_page_roundtrip() {
        let page = LogPage {
            lines: vec![LogLine {
                line_number: 0,
                content: r#"{"type":"user"}"#.to_string(),
            }],
            total_lines: 42,
        };

        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"lineNumber\":0"));
        assert!(json.contains("\"totalLines\":42"));

        let parsed: LogPage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, page);
    }

    #[test]
    fn summary_defaults_for_optional_fields() {
        let json = r#"{"id":"s1","project":"demo","lineCount":3}"#;
        let summary: SessionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.id, "s1");
        assert!(!summary.is_sidechain);
        assert_eq!(summary.parent_session_id, None);
    }
}
