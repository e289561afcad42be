use serde::{Deserialize, Serialize};

/// System-event subtype marking the end-of-turn duration record.
pub const SUBTYPE_TURN_DURATION: &str = "turn_duration";

/// One record in a session's transcript.
///
/// Events arrive as an ordered list; array order is the ordering contract,
/// `parent_id` is informational only. Exactly one of `user` / `assistant` /
/// `system` is meaningful for a given `kind`; consumers must not assume more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEvent {
    /// Unique event identifier (stable key for view state).
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<AssistantPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemInfo>,
}

/// Event kind. Kinds outside the first three are carried through untouched
/// so that unknown record types survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    User,
    Assistant,
    System,
    Progress,
    FileHistorySnapshot,
    QueueOperation,
    #[serde(untagged)]
    Other(String),
}

/// Payload of a USER event: either typed prompt text or a batch of tool
/// results echoed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserPayload {
    Text { text: String },
    ToolResults { results: Vec<ToolResultRecord> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultRecord {
    pub tool_use_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Payload of an ASSISTANT event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageInfo>,
    #[serde(default)]
    pub units: Vec<ContentUnit>,
}

/// Token counters reported with an assistant turn. All counters are optional;
/// absent means "not reported", which aggregation treats as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u64>,
}

/// One unit of assistant content.
///
/// A `ToolCall`'s `id` is the join key against the result record a later
/// USER event carries for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ContentUnit {
    Text {
        text: String,
    },
    Thinking {
        text: String,
    },
    ToolCall {
        id: String,
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    ToolOutcome {
        call_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Payload of a SYSTEM event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl TranscriptEvent {
    /// Plain prompt text, if this is a USER event carrying one.
    pub fn user_text(&self) -> Option<&str> {
        match &self.user {
            Some(UserPayload::Text { text }) => Some(text),
            _ => None,
        }
    }

    /// Tool result records, if this is a USER event carrying a batch.
    pub fn tool_results(&self) -> Option<&[ToolResultRecord]> {
        match &self.user {
            Some(UserPayload::ToolResults { results }) => Some(results),
            _ => None,
        }
    }

    /// First tool-call unit with the given tool name.
    pub fn tool_call(&self, name: &str) -> Option<&ContentUnit> {
        self.assistant.as_ref()?.units.iter().find(
            |unit| matches!(unit, ContentUnit::ToolCall { name: n, .. } if n == name),
        )
    }

    /// First subagent-spawning call unit ("Task" preferred over "Agent").
    pub fn agent_call(&self) -> Option<&ContentUnit> {
        self.tool_call("Task").or_else(|| self.tool_call("Agent"))
    }

    /// Whether the assistant payload carries user-facing text. Text takes
    /// priority over any tool call in the same event when classifying.
    pub fn has_user_facing_text(&self) -> bool {
        self.assistant
            .as_ref()
            .is_some_and(|a| a.units.iter().any(|u| matches!(u, ContentUnit::Text { .. })))
    }

    /// `input + output` tokens for this event, `None` when usage is absent.
    pub fn total_tokens(&self) -> Option<u64> {
        let usage = self.assistant.as_ref()?.usage?;
        Some(usage.input_tokens.unwrap_or(0) + usage.output_tokens.unwrap_or(0))
    }

    /// Whether this is the system record marking a turn's duration.
    pub fn is_turn_duration(&self) -> bool {
        self.kind == EventKind::System
            && self
                .system
                .as_ref()
                .and_then(|s| s.subtype.as_deref())
                .is_some_and(|s| s == SUBTYPE_TURN_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn event_roundtrip() {
        let event = testing::assistant(
            "a1",
            vec![
                testing::thinking("hm"),
                testing::tool_call("call-1", "Read", serde_json::json!({"file_path": "/tmp/x"})),
            ],
        );

        let json = serde_json::to_string(&event).unwrap();
        let parsed: TranscriptEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn unknown_kind_passes_through() {
        let json = r#"{"id":"e1","kind":"compaction_marker"}"#;
        let parsed: TranscriptEvent = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, EventKind::Other("compaction_marker".to_string()));

        let out = serde_json::to_string(&parsed).unwrap();
        assert!(out.contains("compaction_marker"));
    }

    #[test]
    fn user_payload_discriminates_on_shape() {
        let text: UserPayload = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert!(matches!(text, UserPayload::Text { .. }));

        let results: UserPayload = serde_json::from_str(
            r#"{"results":[{"toolUseId":"c1","content":"ok"}]}"#,
        )
        .unwrap();
        match results {
            UserPayload::ToolResults { results } => {
                assert_eq!(results[0].tool_use_id, "c1");
                assert_eq!(results[0].is_error, None);
            }
            _ => panic!("expected tool results"),
        }
    }

    #[test]
    fn text_wins_over_tool_call() {
        let event = testing::assistant(
            "a1",
            vec![
                testing::text_unit("done"),
                testing::tool_call("c1", "Bash", serde_json::json!({"command": "ls"})),
            ],
        );
        assert!(event.has_user_facing_text());
        assert!(event.tool_call("Bash").is_some());
    }

    #[test]
    fn agent_call_prefers_task() {
        let event = testing::assistant(
            "a1",
            vec![
                testing::tool_call("c1", "Agent", serde_json::Value::Null),
                testing::tool_call("c2", "Task", serde_json::Value::Null),
            ],
        );
        match event.agent_call() {
            Some(ContentUnit::ToolCall { id, .. }) => assert_eq!(id, "c2"),
            other => panic!("expected Task call, got {other:?}"),
        }
    }

    #[test]
    fn total_tokens_treats_missing_counters_as_zero() {
        let mut event = testing::assistant("a1", vec![testing::text_unit("hi")]);
        assert_eq!(event.total_tokens(), None);

        event.assistant.as_mut().unwrap().usage = Some(UsageInfo {
            input_tokens: Some(120),
            output_tokens: None,
            ..UsageInfo::default()
        });
        assert_eq!(event.total_tokens(), Some(120));
    }

    #[test]
    fn turn_duration_detection() {
        let marker = testing::turn_marker("s1", 4200);
        assert!(marker.is_turn_duration());

        let other = TranscriptEvent {
            system: Some(SystemInfo {
                subtype: Some("compact".to_string()),
                duration_ms: None,
            }),
            ..testing::turn_marker("s2", 0)
        };
        assert!(!other.is_turn_duration());
    }
}
