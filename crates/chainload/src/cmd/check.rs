//! Check command - Validate configuration and show what a load would send
//!
//! # Usage
//!
//! ```bash
//! chainload check --config chainload.toml
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use chainload_config::Config;
use clap::Args;

use super::load_config;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file (built-in defaults if omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the check command
pub fn run(args: CheckArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", summary(&config));
    Ok(())
}

/// Human-readable summary of a valid configuration
fn summary(config: &Config) -> String {
    let sl = &config.stream_load;
    let mut out = String::new();

    let _ = writeln!(out, "configuration OK");
    let _ = writeln!(out, "endpoint:       {}", sl.url);
    let _ = writeln!(out, "database:       {}", sl.database);
    let _ = writeln!(out, "staging dir:    {}", sl.staging_dir.display());
    let _ = writeln!(out, "flush trigger:  every call with a '{}' record", sl.counting_type);
    let _ = writeln!(out, "load timeout:   {}s", sl.timeout.as_secs());

    for table in &config.tables {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} -> {}",
            table.record_type,
            sl.load_url(&table.table)
        );
        let _ = writeln!(out, "  columns: {}", table.columns_header());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_every_table() {
        let config = Config::default();
        let text = summary(&config);

        assert!(text.starts_with("configuration OK\n"));
        assert!(text.contains("block -> http://127.0.0.1:8030/api/eth/blocks/_stream_load"));
        assert!(text.contains(
            "transaction -> http://127.0.0.1:8030/api/eth/transactions/_stream_load"
        ));
        assert!(text.contains("block_time=from_unixtime(block_timestamp-28800)"));
    }
}
