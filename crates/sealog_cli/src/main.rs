//! SealLog CLI
//!
//! Command-line front end for an encrypted SealLog record store.
//!
//! # Commands
//!
//! - `append` - Record a message (or each line of stdin)
//! - `read` - Decrypt and print records, with optional filters
//! - `tail` - Follow the active segment
//! - `stats` / `list` - Inspect the active and rotated segments
//! - `verify` - Count valid and corrupt lines
//! - `rotate` / `cleanup` / `clear` - Segment maintenance
//! - `export` / `import` - JSON and CSV exchange
//! - `key-info` - Show the key fingerprint

mod commands;

use clap::{Parser, Subcommand};
use sealog_core::{ExchangeFormat, StoreConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Largest `--limit` accepted by any command.
const MAX_LIMIT: usize = 50_000;

/// SealLog encrypted record store tools.
#[derive(Parser)]
#[command(name = "sealog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base directory holding `logs/` and `config/`
    #[arg(global = true, short, long, default_value = ".")]
    dir: PathBuf,

    /// Rotate the active segment once it grows past this many bytes
    #[arg(global = true, long)]
    max_segment_size: Option<u64>,

    /// Delete rotated segments older than this many days
    #[arg(global = true, long)]
    retention_days: Option<u64>,

    /// Never rotate on append
    #[arg(global = true, long)]
    no_rotation: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::in_dir(&self.dir).rotation(!self.no_rotation);
        if let Some(size) = self.max_segment_size {
            config = config.max_segment_size(size);
        }
        if let Some(days) = self.retention_days {
            config = config.retention_days(days);
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Record a message; reads one message per stdin line when none is given
    Append {
        /// Message text
        message: Option<String>,

        /// Hardware identifier stamped on the record
        #[arg(long, env = "SEALOG_HARDWARE_ID", default_value = "unknown")]
        hardware_id: String,
    },

    /// Decrypt and print stored records
    Read {
        /// Only print the last N matching records
        #[arg(short, long, value_parser = parse_limit)]
        limit: Option<usize>,

        /// Case-insensitive substring to look for in messages
        #[arg(short, long)]
        query: Option<String>,

        /// Earliest timestamp to include (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Latest timestamp to include (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,

        /// Replace hardware identifiers in the output
        #[arg(long)]
        redact: bool,

        /// Skip rotated segments
        #[arg(long)]
        active_only: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print records as they are appended
    Tail {
        /// Start with the records already in the active segment
        #[arg(long)]
        from_start: bool,

        /// Replace hardware identifiers in the output
        #[arg(long)]
        redact: bool,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "250")]
        interval_ms: u64,
    },

    /// Show active segment statistics
    Stats {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List segments, oldest first
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify that every stored line decrypts
    Verify {
        /// Skip rotated segments
        #[arg(long)]
        active_only: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Seal the active segment and start a new one
    Rotate,

    /// Delete rotated segments past the retention window
    Cleanup,

    /// Truncate the active segment
    Clear {
        /// Confirm the truncation
        #[arg(long)]
        yes: bool,
    },

    /// Write records to a JSON or CSV file
    Export {
        /// Destination file
        output: PathBuf,

        /// Exchange format; guessed from the extension when omitted
        #[arg(short, long)]
        format: Option<ExchangeFormat>,

        /// Only export the last N records
        #[arg(short, long, value_parser = parse_limit)]
        limit: Option<usize>,
    },

    /// Append records from a JSON or CSV file
    Import {
        /// Source file
        input: PathBuf,

        /// Exchange format; guessed from the extension when omitted
        #[arg(short, long)]
        format: Option<ExchangeFormat>,

        /// Only import the first N entries
        #[arg(short, long, value_parser = parse_limit)]
        limit: Option<usize>,
    },

    /// Show the key file location and fingerprint
    KeyInfo,

    /// Show version information
    Version,
}

fn parse_limit(value: &str) -> Result<usize, String> {
    let limit: usize = value
        .parse()
        .map_err(|_| format!("`{value}` is not a non-negative integer"))?;
    if limit > MAX_LIMIT {
        return Err(format!("limit must be at most {MAX_LIMIT}"));
    }
    Ok(limit)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for records.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.store_config();
    match cli.command {
        Commands::Append {
            message,
            hardware_id,
        } => {
            commands::append::run(config, message.as_deref(), &hardware_id)?;
        }
        Commands::Read {
            limit,
            query,
            since,
            until,
            redact,
            active_only,
            format,
        } => {
            let options = commands::read::ReadOptions {
                limit,
                query,
                since,
                until,
                redact,
                active_only,
            };
            commands::read::run(config, &options, &format)?;
        }
        Commands::Tail {
            from_start,
            redact,
            interval_ms,
        } => {
            commands::tail::run(config, from_start, redact, interval_ms)?;
        }
        Commands::Stats { format } => commands::stats::run(config, &format)?,
        Commands::List { format } => commands::list::run(config, &format)?,
        Commands::Verify {
            active_only,
            format,
        } => commands::verify::run(config, !active_only, &format)?,
        Commands::Rotate => commands::maintenance::rotate(config)?,
        Commands::Cleanup => commands::maintenance::cleanup(config)?,
        Commands::Clear { yes } => {
            if !yes {
                eprintln!("Refusing to clear the active segment without --yes");
                std::process::exit(2);
            }
            commands::maintenance::clear(config)?;
        }
        Commands::Export {
            output,
            format,
            limit,
        } => {
            let format = format
                .or_else(|| ExchangeFormat::from_path(&output))
                .unwrap_or(ExchangeFormat::Json);
            commands::exchange::export(config, format, &output, limit)?;
        }
        Commands::Import {
            input,
            format,
            limit,
        } => {
            let format = format
                .or_else(|| ExchangeFormat::from_path(&input))
                .unwrap_or(ExchangeFormat::Json);
            commands::exchange::import(config, format, &input, limit)?;
        }
        Commands::KeyInfo => commands::key_info::run(config)?,
        Commands::Version => {
            println!("SealLog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("SealLog Core v{}", sealog_core::VERSION);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn limit_above_maximum_is_usage_error() {
        let err = Cli::try_parse_from(["sealog", "read", "--limit", "50001"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert_eq!(err.exit_code(), 2);

        assert!(Cli::try_parse_from(["sealog", "export", "out.json", "--limit", "50000"]).is_ok());
    }

    #[test]
    fn global_options_build_config() {
        let cli = Cli::try_parse_from([
            "sealog",
            "stats",
            "--dir",
            "/tmp/store",
            "--max-segment-size",
            "4096",
            "--retention-days",
            "3",
            "--no-rotation",
        ])
        .unwrap();
        let config = cli.store_config();

        assert_eq!(config.max_segment_size, 4096);
        assert!(!config.rotation);
        assert_eq!(config.retention, std::time::Duration::from_secs(3 * 24 * 60 * 60));
        assert!(config.active_path.starts_with("/tmp/store"));
    }

    #[test]
    fn exchange_format_is_parsed() {
        let cli = Cli::try_parse_from(["sealog", "import", "in.txt", "--format", "CSV"]).unwrap();
        match cli.command {
            Commands::Import { format, .. } => assert_eq!(format, Some(ExchangeFormat::Csv)),
            _ => panic!("expected import"),
        }
        assert!(Cli::try_parse_from(["sealog", "import", "in.txt", "--format", "xml"]).is_err());
    }
}
