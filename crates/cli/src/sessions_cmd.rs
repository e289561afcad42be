use crate::output::{format_timestamp, short_id, truncate};
use anyhow::Result;
use tracelens_core::source::SessionSource;
use tracelens_local_store::LocalStore;

pub async fn run_sessions(
    store: &LocalStore,
    project: Option<&str>,
    include_sidechains: bool,
) -> Result<()> {
    let sessions = store.list_sessions().await?;

    let visible: Vec<_> = sessions
        .iter()
        .filter(|s| include_sidechains || !s.is_sidechain)
        // Sessions with no user prompt (snapshot-only files) are noise in a
        // listing.
        .filter(|s| s.is_sidechain || s.first_message.is_some())
        .filter(|s| project.is_none_or(|p| s.project.contains(p)))
        .collect();

    if visible.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!(
        "{:<10} {:<24} {:>6}  {:<16} {}",
        "ID", "PROJECT", "LINES", "UPDATED", "FIRST MESSAGE"
    );
    for session in visible {
        let first = session.first_message.as_deref().unwrap_or("-");
        let marker = if session.is_sidechain { "↳ " } else { "" };
        println!(
            "{:<10} {:<24} {:>6}  {:<16} {}{}",
            short_id(&session.id),
            truncate(&session.project, 24),
            session.line_count,
            format_timestamp(session.updated_at),
            marker,
            truncate(first, 60),
        );
    }
    Ok(())
}
