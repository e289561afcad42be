use crate::output::truncate;
use anyhow::Result;
use std::collections::HashMap;
use tracelens_core::source::SessionSource;
use tracelens_core::{build_tool_result_index, ContentUnit, ToolResultIndex, TranscriptEvent};
use tracelens_display::{compact_steps, group_with_results, DisplayItem};
use tracelens_local_store::LocalStore;

pub async fn run_show(store: &LocalStore, session: &str) -> Result<()> {
    let events = store.transcript(session).await?;
    let results = build_tool_result_index(&events);
    let agent_map: HashMap<String, String> = store
        .agent_map(session)
        .await?
        .into_iter()
        .map(|m| (m.tool_use_id, m.agent_id))
        .collect();
    let items = group_with_results(&events, &results);

    if items.is_empty() {
        println!("Session {session} has no displayable events.");
        return Ok(());
    }

    for item in &items {
        match item {
            DisplayItem::User { event } => {
                println!("user      | {}", truncate(event.user_text().unwrap_or(""), 100));
            }
            DisplayItem::Assistant { event } => {
                println!("assistant | {}", truncate(first_text(event), 100));
            }
            DisplayItem::ToolCard { tag, event } => {
                println!(
                    "{:<9} | {}{}",
                    tag.label(),
                    truncate(&call_summary(event), 80),
                    outcome_suffix(event, &results),
                );
            }
            DisplayItem::AgentCall { event } => {
                let link = event
                    .agent_call()
                    .and_then(|unit| match unit {
                        ContentUnit::ToolCall { id, .. } => agent_map.get(id),
                        _ => None,
                    })
                    .map(|agent_id| format!("  → subagent {agent_id}"))
                    .unwrap_or_default();
                println!(
                    "agent     | {}{}{}",
                    truncate(&call_summary(event), 80),
                    outcome_suffix(event, &results),
                    link,
                );
            }
            DisplayItem::ActivityRun { steps, tokens, events } => {
                let compacted: Vec<String> = compact_steps(steps)
                    .into_iter()
                    .map(|s| {
                        if s.count > 1 {
                            format!("{} ×{}", s.name, s.count)
                        } else {
                            s.name
                        }
                    })
                    .collect();
                println!(
                    "activity  | {} ({} events, {} tokens)",
                    truncate(&compacted.join(", "), 80),
                    events.len(),
                    tokens,
                );
            }
            DisplayItem::TaskBoard { tasks, .. } => {
                println!("tasks     |");
                for (id, task) in tasks {
                    println!("          |   #{id} [{}] {}", task.status.display(), task.subject);
                }
            }
            DisplayItem::TurnMarker { duration_ms, .. } => {
                println!("turn      | {:.1}s", *duration_ms as f64 / 1000.0);
            }
        }
    }
    Ok(())
}

fn first_text(event: &TranscriptEvent) -> &str {
    event
        .assistant
        .as_ref()
        .and_then(|payload| {
            payload.units.iter().find_map(|unit| match unit {
                ContentUnit::Text { text } => Some(text.as_str()),
                _ => None,
            })
        })
        .unwrap_or("")
}

/// One-line rendering of the event's first tool call.
fn call_summary(event: &TranscriptEvent) -> String {
    let Some(payload) = &event.assistant else {
        return String::new();
    };
    for unit in &payload.units {
        if let ContentUnit::ToolCall { name, input, .. } = unit {
            let detail = input
                .get("command")
                .or_else(|| input.get("prompt"))
                .or_else(|| input.get("description"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            return if detail.is_empty() {
                name.clone()
            } else {
                format!("{name}: {detail}")
            };
        }
    }
    String::new()
}

/// Pairing against the tool-result index: pending when no result arrived,
/// flagged when the result errored.
fn outcome_suffix(event: &TranscriptEvent, results: &ToolResultIndex) -> &'static str {
    let Some(payload) = &event.assistant else {
        return "";
    };
    for unit in &payload.units {
        if let ContentUnit::ToolCall { id, .. } = unit {
            return match results.get(id) {
                Some(entry) if entry.is_error == Some(true) => "  [error]",
                Some(_) => "",
                None => "  [pending]",
            };
        }
    }
    ""
}
