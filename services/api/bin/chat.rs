//! Console chat with the tutor.
//!
//! Reads learner messages line by line from stdin and prints the tutor's
//! replies. Uses the same configuration as the API server; command-line flags
//! override the catalog and history locations.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tutor_api::{bootstrap::build_tutor, config::Config};
use tutor_core::{LearnerInput, session::SessionState};

#[derive(Parser, Debug)]
#[command(version, about = "Chat with the course tutor from the terminal")]
struct Args {
    /// Course catalog JSON file (overrides CATALOG_PATH).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory for module transcripts (overrides HISTORY_DIR).
    #[arg(long)]
    history_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(catalog) = args.catalog {
        config.catalog_path = catalog;
    }
    if let Some(history_dir) = args.history_dir {
        config.history_dir = history_dir;
    }

    // Logs go to stderr so they don't interleave with the conversation.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let tutor = build_tutor(&config)?;
    let mut state = SessionState::new();

    println!("{}", tutor.greeting());
    println!("(Type /next to finish a module, Ctrl+D to quit.)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(input) = LearnerInput::parse(&line) else {
            continue;
        };

        let reply = tutor.process_message(&mut state, input).await;
        println!("{reply}\n");

        if state.course_completed() {
            break;
        }
    }

    info!(messages = state.messages().len(), "Chat session ended");
    Ok(())
}
