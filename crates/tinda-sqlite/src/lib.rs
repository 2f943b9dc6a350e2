//! SQLite-backed domain store and audit log
//!
//! Holds the shop's relational tables (users, products, sales, ...) and the
//! append-only `backup` audit table in a single SQLite file.
//!
//! Key features:
//! - Schema version tracking in `store_meta`
//! - WAL mode and enforced foreign keys
//! - Consistent multi-table read views for backups
//! - All-or-nothing multi-table transactions for restores
//! - Column validation at the insert boundary

pub mod audit;
pub mod read;
pub mod schema;
pub mod store;
pub mod txn;

pub use audit::SqliteAuditLog;
pub use read::SqliteStoreReader;
pub use schema::SCHEMA_VERSION;
pub use store::SqliteDomainStore;
pub use txn::SqliteStoreTxn;

use tinda_core::TindaError;

pub(crate) fn store_err(e: rusqlite::Error) -> TindaError {
    TindaError::Store(e.to_string())
}
