//! TindaTrack Core: types, traits and errors for the backup/restore subsystem
//!
//! This crate defines the abstractions the backup engine is written against:
//! - Domain store: the relational tables of the store (products, sales, ...)
//! - Store transactions: all-or-nothing clear + bulk insert across tables
//! - Audit log: append-only trail of backup and restore actions
//! - Snapshot: the versioned, checksummed document a backup produces
//!
//! Backends live in their own crates (`tinda-sqlite`); the engine itself lives
//! in `tindatrack`.

pub mod config;
pub mod error;
pub mod observe;
pub mod traits;
pub mod types;

pub use config::{BackupConfig, StoreConfig, SynchronousMode};
pub use error::{Result, TindaError};
pub use traits::{AuditLog, DomainStore, StoreReader, StoreTxn};
pub use types::{
    ActionKind, ActorId, AuditRecord, Row, Snapshot, SnapshotBody, TableName, Value,
};
