use crate::output::truncate;
use anyhow::Result;
use std::sync::Arc;
use tracelens_local_store::LocalStore;
use tracelens_logview::{uuid_needle, LogWindow};

pub async fn run_locate(
    store: Arc<LocalStore>,
    session: &str,
    uuid: &str,
    page_size: usize,
) -> Result<()> {
    let window = LogWindow::with_page_size(store, session, page_size);
    window.load_initial().await?;

    match window.locate_and_select(&uuid_needle(uuid)).await? {
        Some(line_number) => {
            if let Some(target) = window.take_scroll_request() {
                println!("viewport centers on line {}", target + 1);
            }
            println!("record {uuid} is on line {}", line_number + 1);
            if let Some(content) = window.line(line_number) {
                println!("{}", truncate(&content, 200));
            }
        }
        None => {
            println!(
                "record {uuid} not found in {} lines",
                window.total_lines()
            );
        }
    }
    Ok(())
}
