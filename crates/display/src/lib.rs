pub mod group;
pub mod item;
pub mod task;

pub use group::{group, group_with_results};
pub use item::{compact_steps, DisplayItem, StepCount, ToolCardTag};
pub use task::{Task, TaskId, TaskStatus, TaskTracker};
