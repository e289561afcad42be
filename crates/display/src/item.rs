use crate::task::{Task, TaskId};
use std::collections::BTreeMap;
use tracelens_core::TranscriptEvent;

/// Standalone tool calls the viewer renders as their own card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCardTag {
    AskQuestion,
    ExitPlan,
    Bash,
}

impl ToolCardTag {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AskQuestion => "ask-question",
            Self::ExitPlan => "exit-plan",
            Self::Bash => "bash",
        }
    }
}

/// One renderable unit of the display plan. Items borrow the grouped events;
/// a grouping pass creates them once and the view consumes them read-only.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem<'a> {
    User {
        event: &'a TranscriptEvent,
    },
    Assistant {
        event: &'a TranscriptEvent,
    },
    ToolCard {
        tag: ToolCardTag,
        event: &'a TranscriptEvent,
    },
    AgentCall {
        event: &'a TranscriptEvent,
    },
    /// Contiguous non-user-facing assistant activity collapsed into one
    /// collapsible unit.
    ActivityRun {
        steps: Vec<String>,
        tokens: u64,
        events: Vec<&'a TranscriptEvent>,
    },
    /// Task map snapshot taken when a run of task-touching calls closed.
    TaskBoard {
        tasks: BTreeMap<TaskId, Task>,
        events: Vec<&'a TranscriptEvent>,
    },
    TurnMarker {
        duration_ms: u64,
        event: &'a TranscriptEvent,
    },
}

impl<'a> DisplayItem<'a> {
    /// Stable key for view-layer expansion state.
    pub fn key(&self) -> String {
        match self {
            Self::User { event }
            | Self::Assistant { event }
            | Self::ToolCard { event, .. }
            | Self::AgentCall { event }
            | Self::TurnMarker { event, .. } => event.id.clone(),
            Self::ActivityRun { events, .. } => format!("run-{}", events[0].id),
            Self::TaskBoard { events, .. } => format!("tasks-{}", events[0].id),
        }
    }

    /// Every input event this item accounts for, in input order. Concatenated
    /// across a whole display plan this reconstructs the grouped event list.
    pub fn member_events(&self) -> Vec<&'a TranscriptEvent> {
        match self {
            Self::User { event }
            | Self::Assistant { event }
            | Self::ToolCard { event, .. }
            | Self::AgentCall { event }
            | Self::TurnMarker { event, .. } => vec![event],
            Self::ActivityRun { events, .. } | Self::TaskBoard { events, .. } => events.clone(),
        }
    }
}

/// One entry of a run-length-compacted step list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCount {
    pub name: String,
    pub count: usize,
}

/// Run-length-compact a step list for summaries like "Bash ×3".
pub fn compact_steps(steps: &[String]) -> Vec<StepCount> {
    let mut result: Vec<StepCount> = Vec::new();
    for step in steps {
        match result.last_mut() {
            Some(last) if last.name == *step => last.count += 1,
            _ => result.push(StepCount {
                name: step.clone(),
                count: 1,
            }),
        }
    }
    result
}
