//! Event builders shared by unit and integration tests across the workspace.

use crate::event::{
    AssistantPayload, ContentUnit, EventKind, SystemInfo, ToolResultRecord, TranscriptEvent,
    UsageInfo, UserPayload,
};

/// USER event carrying plain prompt text.
pub fn user_text(id: &str, text: &str) -> TranscriptEvent {
    TranscriptEvent {
        id: id.to_string(),
        parent_id: None,
        kind: EventKind::User,
        user: Some(UserPayload::Text {
            text: text.to_string(),
        }),
        assistant: None,
        system: None,
    }
}

/// USER event carrying tool results as `(call_id, content, is_error)` triples.
pub fn tool_results(id: &str, results: &[(&str, &str, bool)]) -> TranscriptEvent {
    TranscriptEvent {
        id: id.to_string(),
        parent_id: None,
        kind: EventKind::User,
        user: Some(UserPayload::ToolResults {
            results: results
                .iter()
                .map(|(call_id, content, is_error)| ToolResultRecord {
                    tool_use_id: call_id.to_string(),
                    content: content.to_string(),
                    is_error: Some(*is_error),
                })
                .collect(),
        }),
        assistant: None,
        system: None,
    }
}

/// ASSISTANT event with the given content units and no usage counters.
pub fn assistant(id: &str, units: Vec<ContentUnit>) -> TranscriptEvent {
    TranscriptEvent {
        id: id.to_string(),
        parent_id: None,
        kind: EventKind::Assistant,
        user: None,
        assistant: Some(AssistantPayload {
            model: None,
            stop_reason: None,
            usage: None,
            units,
        }),
        system: None,
    }
}

/// ASSISTANT event with usage counters attached.
pub fn assistant_with_usage(
    id: &str,
    units: Vec<ContentUnit>,
    input_tokens: u64,
    output_tokens: u64,
) -> TranscriptEvent {
    let mut event = assistant(id, units);
    event.assistant.as_mut().unwrap().usage = Some(UsageInfo {
        input_tokens: Some(input_tokens),
        output_tokens: Some(output_tokens),
        ..UsageInfo::default()
    });
    event
}

/// SYSTEM event marking a turn's duration.
pub fn turn_marker(id: &str, duration_ms: u64) -> TranscriptEvent {
    TranscriptEvent {
        id: id.to_string(),
        parent_id: None,
        kind: EventKind::System,
        user: None,
        assistant: None,
        system: Some(SystemInfo {
            subtype: Some(crate::event::SUBTYPE_TURN_DURATION.to_string()),
            duration_ms: Some(duration_ms),
        }),
    }
}

pub fn text_unit(text: &str) -> ContentUnit {
    ContentUnit::Text {
        text: text.to_string(),
    }
}

pub fn thinking(text: &str) -> ContentUnit {
    ContentUnit::Thinking {
        text: text.to_string(),
    }
}

pub fn tool_call(id: &str, name: &str, input: serde_json::Value) -> ContentUnit {
    ContentUnit::ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        input,
    }
}
