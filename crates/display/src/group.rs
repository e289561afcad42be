//! Event grouper: one left-to-right pass over a session's transcript
//! producing the ordered display plan.
//!
//! Two accumulators are pending at any moment (a run of internal assistant
//! activity and a run of task-touching calls) plus one task tracker whose
//! state persists for the whole pass. Grouping is recomputed wholesale
//! whenever the caller's event list changes; it never mutates incrementally.

use crate::item::{DisplayItem, ToolCardTag};
use crate::task::TaskTracker;
use tracelens_core::{
    build_tool_result_index, ContentUnit, EventKind, ToolResultIndex, TranscriptEvent,
};

/// Group a transcript into display items, building the tool-result index
/// internally.
pub fn group(events: &[TranscriptEvent]) -> Vec<DisplayItem<'_>> {
    let results = build_tool_result_index(events);
    group_with_results(events, &results)
}

/// Group a transcript against a caller-built tool-result index.
///
/// Deterministic and total: malformed tool inputs degrade to opaque values
/// and never drop the surrounding item.
pub fn group_with_results<'a>(
    events: &'a [TranscriptEvent],
    results: &ToolResultIndex,
) -> Vec<DisplayItem<'a>> {
    let mut pass = GroupingPass::new(results);
    for event in events {
        pass.push(event);
    }
    pass.finish()
}

struct GroupingPass<'a, 'r> {
    results: &'r ToolResultIndex,
    items: Vec<DisplayItem<'a>>,
    activity: Vec<&'a TranscriptEvent>,
    task_events: Vec<&'a TranscriptEvent>,
    tracker: TaskTracker,
}

impl<'a, 'r> GroupingPass<'a, 'r> {
    fn new(results: &'r ToolResultIndex) -> Self {
        GroupingPass {
            results,
            items: Vec::new(),
            activity: Vec::new(),
            task_events: Vec::new(),
            tracker: TaskTracker::new(),
        }
    }

    fn push(&mut self, event: &'a TranscriptEvent) {
        match event.kind {
            EventKind::User if event.user_text().is_some() => {
                self.flush_all();
                self.items.push(DisplayItem::User { event });
            }
            EventKind::Assistant if event.assistant.is_some() => self.push_assistant(event),
            EventKind::System if event.is_turn_duration() => {
                self.flush_all();
                let duration_ms = event
                    .system
                    .as_ref()
                    .and_then(|s| s.duration_ms)
                    .unwrap_or(0);
                self.items.push(DisplayItem::TurnMarker { duration_ms, event });
            }
            // Tool-result batches, passthrough kinds, and payload-less events
            // ride along with whichever run is open so no event is lost from
            // the plan.
            _ => self.absorb(event),
        }
    }

    // Priority order matters: an event with both text and a tool call is a
    // plain assistant message, a Bash call next to a Task call is a Bash
    // card. First match wins.
    fn push_assistant(&mut self, event: &'a TranscriptEvent) {
        if event.has_user_facing_text() {
            self.flush_all();
            self.items.push(DisplayItem::Assistant { event });
        } else if event.tool_call("AskUserQuestion").is_some() {
            self.flush_all();
            self.items.push(DisplayItem::ToolCard {
                tag: ToolCardTag::AskQuestion,
                event,
            });
        } else if event.tool_call("ExitPlanMode").is_some() {
            self.flush_all();
            self.items.push(DisplayItem::ToolCard {
                tag: ToolCardTag::ExitPlan,
                event,
            });
        } else if event.tool_call("Bash").is_some() {
            self.flush_all();
            self.items.push(DisplayItem::ToolCard {
                tag: ToolCardTag::Bash,
                event,
            });
        } else if event.agent_call().is_some() {
            self.flush_all();
            self.items.push(DisplayItem::AgentCall { event });
        } else if touches_tasks(event) {
            self.flush_activity();
            self.tracker.apply(event, self.results);
            self.task_events.push(event);
        } else {
            self.flush_tasks();
            self.activity.push(event);
        }
    }

    fn absorb(&mut self, event: &'a TranscriptEvent) {
        if !self.task_events.is_empty() {
            self.task_events.push(event);
        } else {
            self.activity.push(event);
        }
    }

    // Activity closes before tasks wherever both are pending.
    fn flush_all(&mut self) {
        self.flush_activity();
        self.flush_tasks();
    }

    fn flush_activity(&mut self) {
        if self.activity.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.activity);

        let mut steps = Vec::new();
        let mut tokens = 0u64;
        for event in &events {
            if let Some(payload) = &event.assistant {
                for unit in &payload.units {
                    match unit {
                        ContentUnit::Thinking { .. } => steps.push("Thinking".to_string()),
                        ContentUnit::ToolCall { name, .. } => steps.push(name.clone()),
                        _ => {}
                    }
                }
            }
            tokens += event.total_tokens().unwrap_or(0);
        }

        self.items.push(DisplayItem::ActivityRun {
            steps,
            tokens,
            events,
        });
    }

    fn flush_tasks(&mut self) {
        if self.task_events.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.task_events);
        self.items.push(DisplayItem::TaskBoard {
            tasks: self.tracker.snapshot(),
            events,
        });
    }

    fn finish(mut self) -> Vec<DisplayItem<'a>> {
        self.flush_all();
        self.items
    }
}

fn touches_tasks(event: &TranscriptEvent) -> bool {
    event.tool_call("TaskCreate").is_some() || event.tool_call("TaskUpdate").is_some()
}
