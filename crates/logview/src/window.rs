//! Windowed loader for a session's raw log.
//!
//! One `LogWindow` instance backs one raw-log view. It keeps a sparse
//! line-number → content cache that only ever grows, fetches whole pages on
//! demand from the session source, and coalesces cache gaps reported by the
//! virtual-scroll layer into the minimal set of page fetches. Responses for
//! an abandoned session need no cancellation: their window is simply dropped
//! with them.

use crate::gaps;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracelens_core::source::{SessionSource, SourceError};

/// Lines per fetch; every range request is a whole multiple-aligned page.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Lines of lookahead added on each side of the visible range before gap
/// detection.
pub const VISIBLE_BUFFER: usize = 50;

/// Builds the canonical needle for locating a record by its uuid field.
/// Matching is a literal substring test against raw line text; an id string
/// nested in some other field can false-positive, which the viewer accepts.
pub fn uuid_needle(id: &str) -> String {
    format!(r#""uuid":"{id}""#)
}

#[derive(Default)]
struct WindowState {
    cache: HashMap<usize, String>,
    total_lines: usize,
    highlight: Option<usize>,
    located: bool,
    scroll_consumed: bool,
}

/// Sparse, gap-aware cache over one session's raw log lines.
///
/// Methods take `&self`; overlapping fetches are safe because cache merges
/// are commutative and idempotent, and duplicate concurrent requests for the
/// same range are suppressed by the in-flight set.
pub struct LogWindow<S> {
    source: Arc<S>,
    session_id: String,
    page_size: usize,
    state: Mutex<WindowState>,
    in_flight: Mutex<HashSet<(usize, usize)>>,
}

/// Releases an in-flight range key when the fetch settles, on every path.
struct RangeGuard<'a> {
    set: &'a Mutex<HashSet<(usize, usize)>>,
    key: (usize, usize),
}

impl Drop for RangeGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().unwrap().remove(&self.key);
    }
}

impl<S: SessionSource> LogWindow<S> {
    pub fn new(source: Arc<S>, session_id: impl Into<String>) -> Self {
        Self::with_page_size(source, session_id, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(source: Arc<S>, session_id: impl Into<String>, page_size: usize) -> Self {
        Self {
            source,
            session_id: session_id.into(),
            page_size: page_size.max(1),
            state: Mutex::new(WindowState::default()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Fetch page zero and learn the file's total line count.
    pub async fn load_initial(&self) -> Result<usize, SourceError> {
        let page = self
            .source
            .log_lines(&self.session_id, 0, self.page_size)
            .await?;

        let mut state = self.state.lock().unwrap();
        state.total_lines = page.total_lines;
        for line in page.lines {
            state.cache.insert(line.line_number, line.content);
        }
        Ok(state.total_lines)
    }

    /// Find the first line containing `needle` and mark it as the highlight
    /// target.
    ///
    /// Scans the already-cached initial page first; when the needle is not
    /// there and the file extends past it, fetches the whole remainder as
    /// one range and scans it in increasing line order. Runs at most once
    /// per window; later calls return the stored answer. A miss leaves the
    /// highlight unset and is not an error.
    pub async fn locate_and_select(&self, needle: &str) -> Result<Option<usize>, SourceError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.located {
                return Ok(state.highlight);
            }
            state.located = true;

            let first_page_end = state.total_lines.min(self.page_size);
            for n in 0..first_page_end {
                if state.cache.get(&n).is_some_and(|line| line.contains(needle)) {
                    state.highlight = Some(n);
                    return Ok(Some(n));
                }
            }
            if state.total_lines <= self.page_size {
                return Ok(None);
            }
        }

        let (offset, remainder) = {
            let state = self.state.lock().unwrap();
            (self.page_size, state.total_lines - self.page_size)
        };
        let page = self
            .source
            .log_lines(&self.session_id, offset, remainder)
            .await?;

        let mut state = self.state.lock().unwrap();
        for line in page.lines {
            state.cache.insert(line.line_number, line.content);
        }
        let hit = (offset..state.total_lines)
            .find(|n| state.cache.get(n).is_some_and(|line| line.contains(needle)));
        if hit.is_some() {
            state.highlight = hit;
        }
        Ok(hit)
    }

    /// Fetch `[start, end)` and merge the lines into the cache.
    ///
    /// Returns `Ok(false)` without touching the source when an identical
    /// range is already in flight. The in-flight key is released when the
    /// request settles, success or failure, so a failed range can be retried
    /// by the next reconciliation pass. A failure leaves previously cached
    /// lines untouched.
    pub async fn fetch_range(&self, start: usize, end: usize) -> Result<bool, SourceError> {
        if end <= start {
            return Ok(false);
        }
        let key = (start, end);
        if !self.in_flight.lock().unwrap().insert(key) {
            return Ok(false);
        }
        let _guard = RangeGuard {
            set: &self.in_flight,
            key,
        };

        let page = self
            .source
            .log_lines(&self.session_id, start, end - start)
            .await?;

        let mut state = self.state.lock().unwrap();
        for line in page.lines {
            state.cache.insert(line.line_number, line.content);
        }
        Ok(true)
    }

    /// React to a new visible index range from the virtual-scroll layer.
    ///
    /// The half-open range is widened by [`VISIBLE_BUFFER`] on each side,
    /// clamped to the file, and every gap in it is fetched page-aligned.
    /// Returns the ranges actually issued (already-in-flight pages are
    /// skipped).
    pub async fn reconcile_visible_range(
        &self,
        visible_start: usize,
        visible_end: usize,
    ) -> Result<Vec<(usize, usize)>, SourceError> {
        let spans = {
            let state = self.state.lock().unwrap();
            if state.total_lines == 0 {
                return Ok(Vec::new());
            }
            let start = visible_start.saturating_sub(VISIBLE_BUFFER);
            let end = visible_end
                .saturating_add(VISIBLE_BUFFER)
                .min(state.total_lines);
            let runs = gaps::missing_runs(&state.cache, start, end);
            gaps::aligned_spans(&runs, self.page_size, state.total_lines)
        };

        let mut issued = Vec::new();
        for (start, end) in spans {
            if self.fetch_range(start, end).await? {
                issued.push((start, end));
            }
        }
        Ok(issued)
    }

    /// One-shot scroll handoff: yields the highlight line exactly once, and
    /// only once the total is known, so the scroll layer centers on it after
    /// its first layout pass.
    pub fn take_scroll_request(&self) -> Option<usize> {
        let mut state = self.state.lock().unwrap();
        if state.scroll_consumed || state.total_lines == 0 {
            return None;
        }
        let highlight = state.highlight?;
        state.scroll_consumed = true;
        Some(highlight)
    }

    /// Cached content for a line; `None` renders as a placeholder row until
    /// reconciliation fills it.
    pub fn line(&self, n: usize) -> Option<String> {
        self.state.lock().unwrap().cache.get(&n).cloned()
    }

    pub fn is_cached(&self, n: usize) -> bool {
        self.state.lock().unwrap().cache.contains_key(&n)
    }

    pub fn cached_lines(&self) -> usize {
        self.state.lock().unwrap().cache.len()
    }

    pub fn total_lines(&self) -> usize {
        self.state.lock().unwrap().total_lines
    }

    pub fn highlight(&self) -> Option<usize> {
        self.state.lock().unwrap().highlight
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
