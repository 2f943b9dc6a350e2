//! TindaTrack: checksummed backups and atomic restores for a retail store
//!
//! TindaTrack snapshots every table of the store into one versioned JSON
//! document and restores such a document by replacing all tables at once:
//! - **Backup**: full read of every table, SHA-256 checksum, named export
//! - **Restore**: shape, schema version and checksum checks, then a single
//!   clear + insert transaction that either fully applies or changes nothing
//! - **Audit trail**: every backup and restore attempt leaves one record
//! - **Daily backup**: at most one automatic backup per day for owners
//!
//! # Quick Start
//!
//! ```no_run
//! use tindatrack::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let db = TindaDb::open("./tindatrack.db")?;
//!
//! let output = db.engine().create_backup(1, Some("alice"), "Before inventory count")?;
//! let path = write_export(std::path::Path::new("./backups"), &output)?;
//!
//! db.engine().restore_from_file(&path, 1, Some("alice"))?;
//! # Ok(())
//! # }
//! ```

pub mod auto_backup;
pub mod checksum;
pub mod db;
pub mod engine;
pub mod error;
pub mod export;
pub mod naming;
pub mod prelude;

// Re-export core types
pub use tinda_core::{
    config::{BackupConfig, StoreConfig, SynchronousMode},
    error::{Result, TindaError},
    row,
    traits::{AuditLog, DomainStore, StoreReader, StoreTxn},
    types::{ActionKind, ActorId, AuditRecord, Row, Snapshot, SnapshotBody, TableName, Value},
};

// Re-export implementations
pub use tinda_sqlite::{
    SqliteAuditLog, SqliteDomainStore, SqliteStoreReader, SqliteStoreTxn, SCHEMA_VERSION,
};

pub use auto_backup::{
    Actor, AutoBackupOutcome, DailyBackup, ShutdownHandle, SkipReason, AUTO_BACKUP_LABEL,
    MIN_CHECK_INTERVAL,
};
pub use db::{SqliteBackupEngine, StoreStatus, TindaDb};
pub use engine::{BackupEngine, BackupOutput, RestoreReport};
pub use error::{AutoBackupError, BackupError, RestoreError};
pub use export::{write_export, LastBackupMarker, MarkerFile};
