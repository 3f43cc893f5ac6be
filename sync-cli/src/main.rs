//! # twinsync
//!
//! Command-line operator console: dual-source proxy list sync and a
//! simulated run dashboard.
//!
//! ## Commands
//!
//! - `status`: Show source URLs and proxy list health
//! - `sources`: Set the source URL of either cluster
//! - `import`: Store a manual proxy list for a cluster
//! - `validate`: Report malformed lines of a stored list
//! - `sync`: Fetch both sources and replace the lists with their valid lines
//! - `run`: Start the metrics simulator and chart its history
//!
//! ## Example
//!
//! ```bash
//! # Point both clusters at their sources
//! twinsync sources --url-a https://example.com/a.txt --url-b https://example.com/b.txt
//!
//! # Fetch both lists (Ctrl-C cancels the session)
//! twinsync sync --log-file session.log
//!
//! # Simulate ten ticks, two seconds apart
//! twinsync run --ticks 10 --tick-secs 2
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use twinsync_types::Side;

mod commands;
mod config;

use commands::{import, run, sources, status, sync, validate};

/// Operator console for dual-source proxy list sync.
#[derive(Parser, Debug)]
#[command(name = "twinsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the persisted console state
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (default: twinsync.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show source URLs and proxy list health
    Status,

    /// Set the source URL of either cluster (an empty value clears it)
    Sources {
        /// Source URL for Cluster A
        #[arg(long)]
        url_a: Option<String>,

        /// Source URL for Cluster B
        #[arg(long)]
        url_b: Option<String>,
    },

    /// Store a manual proxy list for a cluster
    Import {
        /// Cluster to update (a or b)
        side: Side,

        /// File with one address:port per line
        file: PathBuf,
    },

    /// Report malformed lines of a stored proxy list
    Validate {
        /// Cluster to check (a or b)
        side: Side,
    },

    /// Fetch both sources and replace the lists with their valid lines
    Sync {
        /// Override (and store) the source URL for Cluster A
        #[arg(long)]
        url_a: Option<String>,

        /// Override (and store) the source URL for Cluster B
        #[arg(long)]
        url_b: Option<String>,

        /// Write the session log to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Start the metrics simulator and chart its history
    Run {
        /// Stop after this many ticks (default: run until Ctrl-C)
        #[arg(long)]
        ticks: Option<u64>,

        /// Counter value the run starts from
        #[arg(long)]
        target: Option<u64>,

        /// Share of the target added per tick, in percent
        #[arg(long)]
        velocity: Option<u32>,

        /// Seconds between ticks
        #[arg(long)]
        tick_secs: Option<f64>,

        /// Write the run log to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let console_config = config::load_config(cli.config.as_deref(), &data_dir)
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Status => {
            status::run(&data_dir, &console_config).await?;
        }
        Commands::Sources { url_a, url_b } => {
            sources::run(&data_dir, url_a, url_b).await?;
        }
        Commands::Import { side, file } => {
            import::run(&data_dir, side, &file).await?;
        }
        Commands::Validate { side } => {
            validate::run(&data_dir, side).await?;
        }
        Commands::Sync {
            url_a,
            url_b,
            log_file,
        } => {
            sync::run(&data_dir, console_config, url_a, url_b, log_file.as_deref()).await?;
        }
        Commands::Run {
            ticks,
            target,
            velocity,
            tick_secs,
            log_file,
        } => {
            let options = run::RunOptions {
                ticks,
                target,
                velocity,
                tick_secs,
                log_file,
            };
            run::run(&data_dir, console_config, options).await?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber (`RUST_LOG`, default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default data directory for twinsync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "twinsync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
