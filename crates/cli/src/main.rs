mod config;
mod locate_cmd;
mod output;
mod raw_cmd;
mod sessions_cmd;
mod show_cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracelens_local_store::LocalStore;

#[derive(Parser)]
#[command(name = "tracelens", about = "Inspect recorded AI-agent sessions and their raw logs")]
struct Cli {
    /// Directory holding per-project session logs (overrides config)
    #[arg(long, global = true)]
    projects_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered sessions
    Sessions {
        /// Only sessions whose project name contains this string
        #[arg(long)]
        project: Option<String>,

        /// Include subagent (sidechain) sessions
        #[arg(long)]
        all: bool,
    },

    /// Print a session's display plan
    Show {
        /// Session id
        session: String,
    },

    /// Print one page of raw log lines
    Raw {
        /// Session id
        session: String,

        /// First line to print (zero-based)
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Number of lines to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Find the raw log line carrying a record id
    Locate {
        /// Session id
        session: String,

        /// Record uuid to look for
        uuid: String,
    },

    /// Write a session's complete raw log to a file or stdout
    Export {
        /// Session id
        session: String,

        /// Destination file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match config::load(cli.projects_dir) {
        Ok(cfg) => {
            let store = Arc::new(LocalStore::new(cfg.projects_dir));
            match cli.command {
                Commands::Sessions { project, all } => {
                    sessions_cmd::run_sessions(&store, project.as_deref(), all).await
                }
                Commands::Show { session } => show_cmd::run_show(&store, &session).await,
                Commands::Raw {
                    session,
                    offset,
                    limit,
                } => {
                    raw_cmd::run_raw(&store, &session, offset, limit.unwrap_or(cfg.page_size)).await
                }
                Commands::Locate { session, uuid } => {
                    locate_cmd::run_locate(store, &session, &uuid, cfg.page_size).await
                }
                Commands::Export { session, out } => {
                    raw_cmd::run_export(&store, &session, out.as_deref()).await
                }
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
