//! Kino Vimeo CLI - headless driver for the Vimeo tech
//!
//! Features:
//! - Trace replay against a scripted remote player on a simulated clock
//! - Inspection of the player configuration derived from tech options
//! - MIME type probing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
mod replay;
mod scripted;
mod trace;

/// Kino Vimeo CLI - Vimeo tech toolkit
#[derive(Parser)]
#[command(name = "kino-vimeo-cli")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Replay and inspect the Kino Vimeo playback tech", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a trace of host commands and remote player events
    Replay {
        /// Path to a trace JSON file
        trace: PathBuf,
    },

    /// Show the Vimeo player configuration derived from tech options
    Config {
        /// Path to a tech options JSON file
        options: PathBuf,
    },

    /// Check whether the tech plays a MIME type
    CanPlay {
        /// MIME type, e.g. video/vimeo
        mime_type: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    kino_vimeo::init();

    match cli.command {
        Commands::Replay { trace } => {
            commands::replay(&trace, &cli.format).await?;
        }
        Commands::Config { options } => {
            commands::config(&options, &cli.format)?;
        }
        Commands::CanPlay { mime_type } => {
            commands::can_play(&mime_type, &cli.format);
        }
    }

    Ok(())
}
