//! # itemsync
//!
//! Keep local files in step with records in a directory-backed record store.
//!
//! ## Commands
//!
//! - `upload`: Publish a file's bytes (starts tracking it)
//! - `download`: Overwrite a diverged file with the record's bytes
//! - `replace`: Overwrite a diverged record with the file's bytes
//! - `delete`: Delete the record and stop tracking the file
//! - `status`: Show a file's sync status
//!
//! ## Example
//!
//! ```bash
//! itemsync upload notes.txt
//! itemsync status notes.txt
//!
//! # Someone else changed the record: pick a side
//! itemsync download notes.txt
//! itemsync replace notes.txt
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::transfer::Transfer;
use commands::{delete, resolve, status, transfer, Session};
use config::CliConfig;

/// Keep local files in step with a record store.
#[derive(Parser, Debug)]
#[command(name = "itemsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the manifest, settings and default record store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Settings file (default: <data dir>/itemsync.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish a file's bytes
    Upload {
        /// File to upload
        file: PathBuf,
    },

    /// Overwrite a diverged file with the record's bytes
    Download {
        /// File to overwrite
        file: PathBuf,
    },

    /// Overwrite a diverged record with the file's bytes
    Replace {
        /// File to publish
        file: PathBuf,
    },

    /// Delete a file's record and stop tracking it
    Delete {
        /// File whose record to delete
        file: PathBuf,
    },

    /// Show a file's sync status
    Status {
        /// File to inspect
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let config_path = cli
        .config
        .unwrap_or_else(|| data_dir.join(CliConfig::FILE_NAME));
    let config = CliConfig::load(&config_path).await?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::open(&data_dir, config).await?;

    match cli.command {
        Commands::Upload { file } => {
            transfer::run(&mut session, &resolve(&file)?, Transfer::Upload).await?;
        }
        Commands::Download { file } => {
            transfer::run(&mut session, &resolve(&file)?, Transfer::Download).await?;
        }
        Commands::Replace { file } => {
            transfer::run(&mut session, &resolve(&file)?, Transfer::Replace).await?;
        }
        Commands::Delete { file } => {
            delete::run(&mut session, &resolve(&file)?).await?;
        }
        Commands::Status { file } => {
            status::run(&mut session, &resolve(&file)?).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for itemsync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "itemsync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
