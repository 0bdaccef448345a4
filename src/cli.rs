// src/cli.rs
//! Command-line options: a run seed and a log level, parsed with `clap`.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lumencrawl", about = "A terminal roguelike with colored dynamic lighting")]
pub struct Cli {
    /// Seed for map generation and monster AI. Random if omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
