use crate::event::TranscriptEvent;
use std::collections::HashMap;

/// Outcome of one tool invocation, keyed by the call id in [`ToolResultIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcomeEntry {
    pub content: String,
    pub is_error: Option<bool>,
}

/// Lookup from tool-call id to its result. A call id with no entry means the
/// result has not arrived (rendered as pending, not as an error).
pub type ToolResultIndex = HashMap<String, ToolOutcomeEntry>;

/// Build the call-id → result lookup with a single pass over all USER events
/// carrying tool results. Duplicate ids resolve last-write-wins in event
/// order.
pub fn build_tool_result_index(events: &[TranscriptEvent]) -> ToolResultIndex {
    let mut index = ToolResultIndex::new();
    for event in events {
        let Some(results) = event.tool_results() else {
            continue;
        };
        for record in results {
            index.insert(
                record.tool_use_id.clone(),
                ToolOutcomeEntry {
                    content: record.content.clone(),
                    is_error: record.is_error,
                },
            );
        }
    }
    index
}
