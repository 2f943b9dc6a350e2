//! Auto-backup command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tindatrack::prelude::*;
use tindatrack::SkipReason;

pub fn execute(
    db_path: PathBuf,
    actor: Actor,
    out_dir: PathBuf,
    every: Option<u64>,
) -> Result<()> {
    let db = TindaDb::open(&db_path).context("Failed to open database")?;
    let daily = Arc::new(DailyBackup::new(db.engine().clone(), out_dir));

    match every {
        None => run_once(&daily, &actor),
        Some(secs) => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(run_continuous(daily, actor, Duration::from_secs(secs.max(1))))
        }
    }
}

fn run_once(
    daily: &DailyBackup<SqliteDomainStore, SqliteAuditLog>,
    actor: &Actor,
) -> Result<()> {
    let outcome = daily.run_if_due(actor).context("Automatic backup failed")?;

    match outcome {
        AutoBackupOutcome::Created { path, size_bytes } => {
            println!("✓ Daily backup written to {} ({} bytes)", path.display(), size_bytes);
        }
        AutoBackupOutcome::Skipped(SkipReason::NotOwner) => {
            println!("Skipped: automatic backups run only for owners");
        }
        AutoBackupOutcome::Skipped(SkipReason::AlreadyRanToday(date)) => {
            println!("Skipped: already backed up on {}", date);
        }
    }

    Ok(())
}

async fn run_continuous(
    daily: Arc<DailyBackup<SqliteDomainStore, SqliteAuditLog>>,
    actor: Actor,
    every: Duration,
) -> Result<()> {
    let shutdown = ShutdownHandle::new();
    let task = tokio::spawn(daily.run_periodic(actor, every, shutdown.subscribe()));

    println!("Checking every {}s, press Ctrl-C to stop", every.as_secs());
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    shutdown.shutdown();
    task.await.context("Auto backup loop panicked")?;
    Ok(())
}
