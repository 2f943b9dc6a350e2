//! Unified TindaTrack database interface
//!
//! Opens the SQLite store and its audit log together and hands out a
//! [`BackupEngine`] wired to both.

use std::path::Path;
use std::sync::Arc;
use tinda_core::{BackupConfig, DomainStore, Result, StoreConfig, TableName};
use tinda_sqlite::{SqliteAuditLog, SqliteDomainStore};

use crate::engine::BackupEngine;

/// Engine type used by [`TindaDb`]
pub type SqliteBackupEngine = BackupEngine<SqliteDomainStore, SqliteAuditLog>;

/// Unified TindaTrack database
pub struct TindaDb {
    store: Arc<SqliteDomainStore>,
    audit: Arc<SqliteAuditLog>,
    engine: Arc<SqliteBackupEngine>,
}

/// Schema version and row counts of an open store
#[derive(Debug, Clone)]
pub struct StoreStatus {
    pub schema_version: u32,
    pub tables: Vec<(TableName, u64)>,
}

impl StoreStatus {
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|(_, n)| n).sum()
    }
}

impl TindaDb {
    /// Open (or create) a database file with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store_config = StoreConfig::new(path.as_ref().to_path_buf());
        Self::open_with_config(store_config, BackupConfig::default())
    }

    /// Open with custom configurations
    pub fn open_with_config(store_config: StoreConfig, backup_config: BackupConfig) -> Result<Self> {
        let store = Arc::new(SqliteDomainStore::open(store_config)?);
        let audit = Arc::new(store.audit_log());
        let engine = Arc::new(BackupEngine::new(store.clone(), audit.clone(), backup_config));

        Ok(Self {
            store,
            audit,
            engine,
        })
    }

    pub fn store(&self) -> &Arc<SqliteDomainStore> {
        &self.store
    }

    pub fn audit(&self) -> &Arc<SqliteAuditLog> {
        &self.audit
    }

    pub fn engine(&self) -> &Arc<SqliteBackupEngine> {
        &self.engine
    }

    /// Current schema version and the row count of every table
    pub fn status(&self) -> Result<StoreStatus> {
        let schema_version = self.store.schema_version()?;
        let tables = self
            .store
            .list_tables()
            .into_iter()
            .map(|t| self.store.count(t).map(|n| (t, n)))
            .collect::<Result<Vec<_>>>()?;

        Ok(StoreStatus {
            schema_version,
            tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tinda_core::row;

    #[test]
    fn test_status_counts_rows() {
        let dir = TempDir::new().unwrap();
        let db = TindaDb::open(dir.path().join("shop.db")).unwrap();

        db.store()
            .insert_rows(
                TableName::Categories,
                &[row! { "category_id" => 1, "name" => "Drinks" }],
            )
            .unwrap();

        let status = db.status().unwrap();
        assert_eq!(status.schema_version, tinda_sqlite::SCHEMA_VERSION);
        assert_eq!(status.tables.len(), TableName::ALL.len());
        assert_eq!(status.total_rows(), 1);
        assert!(status.tables.contains(&(TableName::Categories, 1)));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.db");
        {
            let db = TindaDb::open(&path).unwrap();
            db.store()
                .insert_rows(
                    TableName::Suppliers,
                    &[row! { "supplier_id" => 1, "name" => "Acme" }],
                )
                .unwrap();
        }

        let db = TindaDb::open(&path).unwrap();
        assert_eq!(db.store().count(TableName::Suppliers).unwrap(), 1);
    }
}
