//! chainload - Load blockchain records into StarRocks
//!
//! # Usage
//!
//! ```bash
//! # Load JSON lines from a file
//! chainload load --config chainload.toml --input blocks_and_transactions.json
//!
//! # Load from stdin
//! ethereumetl stream ... | chainload load --config chainload.toml
//!
//! # Validate a config and print the load columns per table
//! chainload check --config chainload.toml
//! ```

mod cmd;
mod logging;

use anyhow::Result;
use chainload_config::LogLevel;
use clap::{Parser, Subcommand};

/// chainload - Batch chain records into staging files and stream-load them into StarRocks
#[derive(Parser, Debug)]
#[command(name = "chainload")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read JSON-lines records and load them
    Load(cmd::load::LoadArgs),

    /// Validate configuration and show table mappings
    Check(cmd::check::CheckArgs),
}

// One thread: input is read synchronously between awaited loads
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Load(args) => {
            let config = cmd::load_config(args.config.as_deref())?;
            logging::init(&config.log, cli.log_level)?;
            cmd::load::run(args, config).await
        }
        Command::Check(args) => {
            // Check only prints to stdout
            cmd::check::run(args)
        }
    }
}
