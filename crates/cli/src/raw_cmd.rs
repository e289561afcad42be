use crate::output::{short_id, truncate};
use anyhow::{Context, Result};
use std::path::Path;
use tracelens_core::source::SessionSource;
use tracelens_local_store::LocalStore;
use tracelens_logview::summary::{format_clock_time, summarize};

pub async fn run_raw(
    store: &LocalStore,
    session: &str,
    offset: usize,
    limit: usize,
) -> Result<()> {
    let page = store.log_lines(session, offset, limit).await?;
    println!(
        "{}: lines {}..{} of {}",
        session,
        offset + 1,
        (offset + page.lines.len()).max(offset + 1),
        page.total_lines,
    );

    for line in &page.lines {
        let summary = summarize(&line.content);
        println!(
            "{:>7} {:<10} {:<8} {:<8} {}",
            line.line_number + 1,
            if summary.raw_kind.is_empty() { "?" } else { summary.kind.label() },
            short_id(&summary.id),
            format_clock_time(&summary.timestamp),
            truncate(&line.content, 120),
        );
    }
    Ok(())
}

/// Whole-file export; a single fetch unrelated to the windowed cache.
pub async fn run_export(store: &LocalStore, session: &str, out: Option<&Path>) -> Result<()> {
    let raw = store.raw_log(session).await?;
    match out {
        Some(path) => {
            std::fs::write(path, &raw)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {} bytes to {}", raw.len(), path.display());
        }
        None => print!("{raw}"),
    }
    Ok(())
}
