pub mod gaps;
pub mod summary;
pub mod window;

pub use summary::{summarize, LineSummary, RecordKind};
pub use window::{uuid_needle, LogWindow, DEFAULT_PAGE_SIZE, VISIBLE_BUFFER};
