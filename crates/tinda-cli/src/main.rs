//! TindaTrack CLI - backups and restores from the command line

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "tindatrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the database file
    #[arg(short, long, default_value = "./tindatrack.db")]
    db_path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and its tables
    Init,

    /// Schema version and row counts
    Status,

    /// Snapshot every table into a backup file
    Backup {
        /// Name of the backup
        #[arg(short, long)]
        label: String,

        /// Id of the user taking the backup
        #[arg(long, default_value = "0")]
        actor_id: String,

        /// Display name of the user taking the backup
        #[arg(long)]
        actor_name: Option<String>,

        /// Directory the backup file is written to
        #[arg(short, long, default_value = "./backups")]
        out_dir: PathBuf,
    },

    /// Replace every table with the content of a backup file
    Restore {
        /// Backup file to restore
        file: PathBuf,

        /// Id of the user restoring
        #[arg(long, default_value = "0")]
        actor_id: String,

        /// Display name of the user restoring
        #[arg(long)]
        actor_name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show recent backup and restore operations
    History {
        /// Number of records to show
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// Take the daily automatic backup if it is due
    AutoBackup {
        /// Id of the logged-in user
        #[arg(long)]
        actor_id: String,

        /// Display name of the logged-in user
        #[arg(long)]
        actor_name: String,

        /// Role of the logged-in user; only owners trigger backups
        #[arg(long)]
        role: String,

        /// Directory backup files are written to
        #[arg(short, long, default_value = "./backups")]
        out_dir: PathBuf,

        /// Keep running, checking every N seconds until interrupted
        #[arg(long)]
        every: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Init => {
            commands::init::execute(cli.db_path)?;
        }
        Commands::Status => {
            commands::status::execute(cli.db_path)?;
        }
        Commands::Backup {
            label,
            actor_id,
            actor_name,
            out_dir,
        } => {
            commands::backup::execute(cli.db_path, &label, &actor_id, actor_name, out_dir)?;
        }
        Commands::Restore {
            file,
            actor_id,
            actor_name,
            force,
        } => {
            commands::restore::execute(cli.db_path, file, &actor_id, actor_name, force)?;
        }
        Commands::History { limit } => {
            commands::history::execute(cli.db_path, limit)?;
        }
        Commands::AutoBackup {
            actor_id,
            actor_name,
            role,
            out_dir,
            every,
        } => {
            let actor = tindatrack::Actor::new(actor_id.as_str(), actor_name, role);
            commands::auto_backup::execute(cli.db_path, actor, out_dir, every)?;
        }
    }

    Ok(())
}
