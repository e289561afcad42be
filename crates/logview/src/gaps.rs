//! Gap detection over the sparse line cache.
//!
//! A gap is a maximal contiguous run of line numbers with no cache entry.
//! Fetches are always issued for whole pages, so every gap is widened to the
//! page spans that cover it; spans from adjacent gaps that land on the same
//! page collapse into one.

use std::collections::{BTreeSet, HashMap};

/// Maximal runs of missing cache entries within `[start, end)`, as
/// half-open `(run_start, run_end)` pairs in increasing order.
pub fn missing_runs(cache: &HashMap<usize, String>, start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for n in start..end {
        if cache.contains_key(&n) {
            if let Some(s) = run_start.take() {
                runs.push((s, n));
            }
        } else if run_start.is_none() {
            run_start = Some(n);
        }
    }
    if let Some(s) = run_start {
        runs.push((s, end));
    }
    runs
}

/// Page-aligned fetch spans covering the given gaps: the minimal set of
/// whole pages (clamped to `total` at the tail) whose union contains every
/// gap. Deduplicated and sorted.
pub fn aligned_spans(
    gaps: &[(usize, usize)],
    page_size: usize,
    total: usize,
) -> Vec<(usize, usize)> {
    let mut spans = BTreeSet::new();
    for &(gap_start, gap_end) in gaps {
        if gap_end <= gap_start {
            continue;
        }
        let first_page = gap_start / page_size;
        let last_page = (gap_end - 1) / page_size;
        for page in first_page..=last_page {
            let start = page * page_size;
            let end = ((page + 1) * page_size).min(total);
            if end > start {
                spans.insert((start, end));
            }
        }
    }
    spans.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(lines: &[usize]) -> HashMap<usize, String> {
        lines.iter().map(|&n| (n, String::new())).collect()
    }

    #[test]
    fn empty_cache_is_one_gap() {
        let runs = missing_runs(&HashMap::new(), 450, 570);
        assert_eq!(runs, vec![(450, 570)]);
    }

    #[test]
    fn cached_entries_split_runs() {
        let cache = cache_with(&[3, 4, 7]);
        let runs = missing_runs(&cache, 0, 10);
        assert_eq!(runs, vec![(0, 3), (5, 7), (8, 10)]);
    }

    #[test]
    fn fully_cached_range_has_no_runs() {
        let cache = cache_with(&[0, 1, 2]);
        assert!(missing_runs(&cache, 0, 3).is_empty());
    }

    #[test]
    fn single_narrow_gap_aligns_to_one_page() {
        // Visible [500, 520) buffered to [450, 570) on an empty cache
        // aligns to exactly one page fetch, [400, 600).
        let spans = aligned_spans(&[(450, 570)], 200, 10_000);
        assert_eq!(spans, vec![(400, 600)]);
    }

    #[test]
    fn wide_gap_covers_minimal_page_set() {
        let spans = aligned_spans(&[(450, 700)], 200, 10_000);
        assert_eq!(spans, vec![(400, 600), (600, 800)]);
    }

    #[test]
    fn adjacent_gaps_on_one_page_dedupe() {
        let spans = aligned_spans(&[(410, 420), (430, 440)], 200, 10_000);
        assert_eq!(spans, vec![(400, 600)]);
    }

    #[test]
    fn tail_page_clamps_to_total() {
        let spans = aligned_spans(&[(950, 980)], 200, 1_000 - 20);
        assert_eq!(spans, vec![(800, 980)]);
    }

    #[test]
    fn empty_gap_is_ignored() {
        assert!(aligned_spans(&[(500, 500)], 200, 10_000).is_empty());
    }
}
