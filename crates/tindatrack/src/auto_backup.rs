//! Automatic daily backup
//!
//! Runs at most one backup per UTC calendar day, and only for store owners.
//! The export is written to disk before the day is marked as done, so a
//! failed export is retried on the next tick.
//!
//! # Example
//!
//! ```no_run
//! use tindatrack::prelude::*;
//! use tindatrack::auto_backup::{Actor, DailyBackup, ShutdownHandle};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let db = TindaDb::open("./tindatrack.db")?;
//! let daily = Arc::new(DailyBackup::new(db.engine().clone(), "./backups"));
//! let owner = Actor::new(1, "alice", "Owner");
//!
//! let shutdown = ShutdownHandle::new();
//! let task = tokio::spawn(daily.run_periodic(owner, Duration::from_secs(3600), shutdown.subscribe()));
//!
//! // ... later
//! shutdown.shutdown();
//! task.await?;
//! # Ok(())
//! # }
//! ```

use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tinda_core::{ActorId, AuditLog, DomainStore};
use tokio::sync::watch;

use crate::engine::BackupEngine;
use crate::error::AutoBackupError;
use crate::export::{write_export, LastBackupMarker, MarkerFile};

/// Label given to automatic backups
pub const AUTO_BACKUP_LABEL: &str = "Automatic Daily Backup";

/// Shortest period accepted by [`DailyBackup::run_periodic`]
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// The logged-in user on whose behalf the daily backup runs
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub role: String,
}

impl Actor {
    pub fn new(id: impl Into<ActorId>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
        }
    }

    pub fn is_owner(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case("owner")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotOwner,
    AlreadyRanToday(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoBackupOutcome {
    Skipped(SkipReason),
    Created { path: PathBuf, size_bytes: u64 },
}

/// Daily backup driver
pub struct DailyBackup<S: DomainStore, A: AuditLog> {
    engine: Arc<BackupEngine<S, A>>,
    export_dir: PathBuf,
    marker: MarkerFile,
}

impl<S: DomainStore, A: AuditLog> DailyBackup<S, A> {
    pub fn new(engine: Arc<BackupEngine<S, A>>, export_dir: impl Into<PathBuf>) -> Self {
        let export_dir = export_dir.into();
        let marker = MarkerFile::new(&export_dir);
        Self {
            engine,
            export_dir,
            marker,
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Run the backup if the actor is an owner and none ran today (UTC)
    pub fn run_if_due(&self, actor: &Actor) -> Result<AutoBackupOutcome, AutoBackupError> {
        self.run_if_due_on(actor, Utc::now().date_naive())
    }

    /// Same as [`run_if_due`](Self::run_if_due) for an explicit calendar day
    pub fn run_if_due_on(
        &self,
        actor: &Actor,
        today: NaiveDate,
    ) -> Result<AutoBackupOutcome, AutoBackupError> {
        if !actor.is_owner() {
            tracing::debug!("{} is not an owner, skipping auto backup", actor.name);
            return Ok(AutoBackupOutcome::Skipped(SkipReason::NotOwner));
        }

        let last = match self.marker.read() {
            Ok(marker) => marker,
            Err(e) => {
                tracing::warn!(
                    "Unreadable marker at {}, treating as no previous backup: {}",
                    self.marker.path().display(),
                    e
                );
                None
            }
        };
        if let Some(last) = last {
            if last.date == today {
                tracing::debug!("Already backed up on {}, skipping", today);
                return Ok(AutoBackupOutcome::Skipped(SkipReason::AlreadyRanToday(today)));
            }
        }

        tracing::info!("Running automatic daily backup for {}", actor.name);
        let output = self.engine.create_backup(
            actor.id.clone(),
            Some(actor.name.as_str()),
            AUTO_BACKUP_LABEL,
        )?;
        let path = write_export(&self.export_dir, &output)?;

        self.marker.write(&LastBackupMarker {
            date: today,
            file_name: output.file_name.clone(),
            created_at: output.created_at,
        })?;

        tracing::info!("Daily auto backup completed: {}", output.file_name);
        Ok(AutoBackupOutcome::Created {
            path,
            size_bytes: output.size_bytes,
        })
    }
}

impl<S, A> DailyBackup<S, A>
where
    S: DomainStore + 'static,
    A: AuditLog + 'static,
{
    /// Check on every tick of `every` until `shutdown` flips to `true`.
    ///
    /// The first check happens immediately. Failures are logged and retried
    /// on the next tick. Periods below [`MIN_CHECK_INTERVAL`] are raised to it.
    pub async fn run_periodic(
        self: Arc<Self>,
        actor: Actor,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let every = every.max(MIN_CHECK_INTERVAL);
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let this = self.clone();
                    let actor = actor.clone();
                    match tokio::task::spawn_blocking(move || this.run_if_due(&actor)).await {
                        Ok(Ok(AutoBackupOutcome::Created { path, .. })) => {
                            tracing::info!("Auto backup written to {}", path.display());
                        }
                        Ok(Ok(AutoBackupOutcome::Skipped(reason))) => {
                            tracing::debug!("Auto backup skipped: {:?}", reason);
                        }
                        Ok(Err(e)) => tracing::error!("Auto backup failed: {}", e),
                        Err(e) => tracing::error!("Auto backup task panicked: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Auto backup loop stopping");
                        break;
                    }
                }
            }
        }
    }
}

/// Handle for stopping [`DailyBackup::run_periodic`]
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_check_is_case_insensitive() {
        assert!(Actor::new(1, "alice", "Owner").is_owner());
        assert!(Actor::new(1, "alice", " OWNER ").is_owner());
        assert!(!Actor::new(2, "bob", "cashier").is_owner());
    }
}
