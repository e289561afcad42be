//! Lenient transcript parsing: raw JSONL records into core events.
//!
//! One line is one record; malformed lines are logged and skipped rather
//! than failing the whole transcript (the raw view still shows them).

use serde::Deserialize;
use std::io::BufRead;
use tracelens_core::{
    AssistantPayload, ContentUnit, EventKind, SystemInfo, ToolResultRecord, TranscriptEvent,
    UsageInfo, UserPayload,
};

// ── Raw JSONL record types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawRecord {
    User(RawConversationEntry),
    Assistant(RawConversationEntry),
    System(RawSystemEntry),
    Progress {},
    FileHistorySnapshot {},
    QueueOperation {},
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConversationEntry {
    uuid: String,
    #[serde(default)]
    parent_uuid: Option<String>,
    message: RawMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
    content: RawContent,
    #[serde(default)]
    usage: Option<RawUsage>,
}

/// User content is a plain string or an array of blocks; assistant content
/// is always an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Text(String),
    Blocks(Vec<RawBlock>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawBlock {
    Text {
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: Option<String>,
    },
    ToolUse {
        #[serde(default)]
        id: Option<String>,
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: serde_json::Value,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct RawUsage {
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
    #[serde(default)]
    cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    cache_read_input_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSystemEntry {
    uuid: String,
    #[serde(default)]
    parent_uuid: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    duration_ms: Option<u64>,
}

// ── Conversion ──────────────────────────────────────────────────────────────

/// Parse all transcript events from a JSONL reader, in line order.
pub fn parse_transcript<R: BufRead>(reader: R) -> Vec<TranscriptEvent> {
    let mut events = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("failed to read transcript line {}: {e}", line_number + 1);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let record: RawRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("skipping unparseable line {}: {e}", line_number + 1);
                continue;
            }
        };
        if let Some(event) = record_to_event(record) {
            events.push(event);
        }
    }
    events
}

fn record_to_event(record: RawRecord) -> Option<TranscriptEvent> {
    match record {
        RawRecord::User(entry) => Some(TranscriptEvent {
            user: user_payload(&entry.message.content),
            id: entry.uuid,
            parent_id: entry.parent_uuid,
            kind: EventKind::User,
            assistant: None,
            system: None,
        }),
        RawRecord::Assistant(entry) => Some(TranscriptEvent {
            assistant: Some(assistant_payload(entry.message)),
            id: entry.uuid,
            parent_id: entry.parent_uuid,
            kind: EventKind::Assistant,
            user: None,
            system: None,
        }),
        RawRecord::System(entry) => Some(TranscriptEvent {
            id: entry.uuid,
            parent_id: entry.parent_uuid,
            kind: EventKind::System,
            user: None,
            assistant: None,
            system: Some(SystemInfo {
                subtype: entry.subtype,
                duration_ms: entry.duration_ms,
            }),
        }),
        // Progress and bookkeeping records never render in the transcript
        // view; the raw view shows them verbatim.
        RawRecord::Progress {}
        | RawRecord::FileHistorySnapshot {}
        | RawRecord::QueueOperation {}
        | RawRecord::Unknown => None,
    }
}

fn user_payload(content: &RawContent) -> Option<UserPayload> {
    match content {
        RawContent::Text(text) => Some(UserPayload::Text { text: text.clone() }),
        RawContent::Blocks(blocks) => {
            let results: Vec<ToolResultRecord> = blocks
                .iter()
                .filter_map(|block| match block {
                    RawBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    } => Some(ToolResultRecord {
                        tool_use_id: tool_use_id.clone(),
                        content: value_to_string(content),
                        is_error: *is_error,
                    }),
                    _ => None,
                })
                .collect();
            if !results.is_empty() {
                return Some(UserPayload::ToolResults { results });
            }
            blocks.iter().find_map(|block| match block {
                RawBlock::Text { text } => Some(UserPayload::Text { text: text.clone() }),
                _ => None,
            })
        }
    }
}

fn assistant_payload(message: RawMessage) -> AssistantPayload {
    let units = match message.content {
        RawContent::Blocks(blocks) => blocks
            .into_iter()
            .filter_map(|block| match block {
                RawBlock::Text { text } => Some(ContentUnit::Text { text }),
                RawBlock::Thinking { thinking } => Some(ContentUnit::Thinking {
                    text: thinking.unwrap_or_default(),
                }),
                RawBlock::ToolUse { id, name, input } => Some(ContentUnit::ToolCall {
                    id: id.unwrap_or_default(),
                    name,
                    input,
                }),
                RawBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => Some(ContentUnit::ToolOutcome {
                    call_id: tool_use_id,
                    content: value_to_string(&content),
                    is_error,
                }),
                RawBlock::Other => None,
            })
            .collect(),
        // A bare-string assistant message is unusual but tolerated.
        RawContent::Text(text) => vec![ContentUnit::Text { text }],
    };

    AssistantPayload {
        model: message.model,
        stop_reason: message.stop_reason,
        usage: message.usage.map(|u| UsageInfo {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
            cache_creation_input_tokens: u.cache_creation_input_tokens,
            cache_read_input_tokens: u.cache_read_input_tokens,
        }),
        units,
    }
}

/// Tool-result content arrives as a string, an array of blocks, or null;
/// everything non-string renders as its JSON text.
fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
