use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracelens_core::{ContentUnit, ToolResultIndex, TranscriptEvent};

/// Task ids are extracted from creation-result text like "Task #7 created".
static TASK_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Task #(\d+)").unwrap());

/// Identifier of a tracked task: the digits extracted from the creation
/// result, or the originating call id when none were found.
///
/// Ordering is numeric for all-digit ids and lexicographic otherwise, with
/// numeric ids sorting first, so a `BTreeMap<TaskId, _>` iterates "2" before
/// "10" and stays stable across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Deleted,
}

impl TaskStatus {
    pub fn display(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub subject: String,
    pub status: TaskStatus,
}

/// Maintains task identity and status across a run of task-management tool
/// calls. Tasks are mutated in place and never removed (deletion is a status),
/// so iteration order is stable across every snapshot taken from one pass.
#[derive(Debug, Default)]
pub struct TaskTracker {
    tasks: BTreeMap<TaskId, Task>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every TaskCreate/TaskUpdate call unit of `event`, in encounter
    /// order. Inputs are read leniently; a call whose input is not the
    /// expected shape is skipped rather than failing the pass.
    pub fn apply(&mut self, event: &TranscriptEvent, results: &ToolResultIndex) {
        let Some(payload) = &event.assistant else {
            return;
        };
        for unit in &payload.units {
            let ContentUnit::ToolCall { id, name, input } = unit else {
                continue;
            };
            match name.as_str() {
                "TaskCreate" => self.apply_create(id, input, results),
                "TaskUpdate" => self.apply_update(input),
                _ => {}
            }
        }
    }

    fn apply_create(&mut self, call_id: &str, input: &serde_json::Value, results: &ToolResultIndex) {
        let subject = input
            .get("subject")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        // The tool result echoes the assigned id ("Task #7 created"); fall
        // back to the call id when the result is missing or has no match.
        let task_id = results
            .get(call_id)
            .and_then(|entry| TASK_ID_RE.captures(&entry.content))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| call_id.to_string());

        self.tasks.insert(
            TaskId::new(task_id),
            Task {
                subject,
                status: TaskStatus::Pending,
            },
        );
    }

    fn apply_update(&mut self, input: &serde_json::Value) {
        let Some(task_id) = input.get("taskId").and_then(|v| v.as_str()) else {
            return;
        };
        let Some(status) = input
            .get("status")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<TaskStatus>().ok())
        else {
            return;
        };

        let key = TaskId::new(task_id);
        match self.tasks.get_mut(&key) {
            Some(task) => task.status = status,
            // An update can arrive before its create resolves; synthesize an
            // entry so later snapshots stay consistent.
            None => {
                self.tasks.insert(
                    key,
                    Task {
                        subject: format!("Task {task_id}"),
                        status,
                    },
                );
            }
        }
    }

    /// Immutable copy of the current task map; later mutations do not affect
    /// snapshots already taken.
    pub fn snapshot(&self) -> BTreeMap<TaskId, Task> {
        self.tasks.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
