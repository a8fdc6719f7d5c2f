//! lanesync CLI.
//!
//! Usage:
//!   # Replay a recorded session, printing the board after every step
//!   lanesync replay --config board.ron --session session.json
//!
//!   # Same, with every commit denied at invocation time, as JSON lines
//!   lanesync replay --config board.ron --session session.json --deny-commits --json
//!
//!   # Validate a board config
//!   lanesync check-config board.ron
//!
//! Logs go to stderr (`RUST_LOG` to tune); stdout carries only the board.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use lanesync_cli::{OutputFormat, ScriptBackend, Session, replay};
use lanesync_core::BoardConfig;

#[derive(Parser, Debug)]
#[command(name = "lanesync")]
#[command(about = "Optimistic lane/card reordering engine, driven from recorded sessions")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a session file through a fresh board
    Replay {
        /// Board config (RON)
        #[arg(short, long)]
        config: PathBuf,

        /// Session script (JSON)
        #[arg(short, long)]
        session: PathBuf,

        /// Permission gate refuses every card
        #[arg(long)]
        read_only: bool,

        /// Commit gate refuses every commit (moves still pass the permission gate)
        #[arg(long)]
        deny_commits: bool,

        /// Emit one JSON object per step instead of text
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a board config
    CheckConfig {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Replay { config, session, read_only, deny_commits, json } => {
            let board_config = BoardConfig::load(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let session = Session::load(&session)?;
            let format = if json { OutputFormat::Json } else { OutputFormat::Text };

            tracing::info!(
                steps = session.steps.len(),
                read_only,
                deny_commits,
                "Replaying session"
            );

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let board = replay(
                &board_config,
                &session,
                ScriptBackend::new(read_only, deny_commits),
                format,
                &mut out,
            )?;
            out.flush()?;

            let backend = board.backend();
            tracing::info!(
                commits = backend.commits.len(),
                refreshes = backend.refreshes,
                pending = board.pending().count(),
                "Replay finished"
            );
        }
        Command::CheckConfig { path } => {
            let config = BoardConfig::load(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            let settings = config.settings();
            println!(
                "ok: batch {}, on denied commit {}, refresh after move {}",
                settings
                    .batch_size
                    .get()
                    .map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
                settings.on_denied_commit,
                settings.refresh_after_move
            );
        }
    }

    Ok(())
}
