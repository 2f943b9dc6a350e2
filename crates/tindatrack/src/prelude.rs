//! TindaTrack Prelude
//!
//! Import this to get all commonly used types and traits:
//!
//! ```
//! use tindatrack::prelude::*;
//! ```

// Core types
pub use crate::{
    ActionKind, ActorId, AuditRecord, Result, Row, Snapshot, TableName, TindaDb, TindaError, Value,
};

// Configs
pub use crate::{BackupConfig, StoreConfig, SynchronousMode};

// Traits
pub use crate::{AuditLog, DomainStore, StoreReader, StoreTxn};

// Engine
pub use crate::{
    AutoBackupError, BackupEngine, BackupError, BackupOutput, RestoreError, RestoreReport,
};

// Implementations
pub use crate::{SqliteAuditLog, SqliteDomainStore};

// Export and daily backup
pub use crate::{write_export, Actor, AutoBackupOutcome, DailyBackup, ShutdownHandle};

pub use crate::row;

// Re-export common external deps
pub use std::sync::Arc;
pub use tracing;
