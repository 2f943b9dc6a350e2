use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;
use tinda_core::{DomainStore, Result, Row, StoreConfig, StoreTxn, TableName, TindaError};

use crate::audit::SqliteAuditLog;
use crate::read::{self, SqliteStoreReader};
use crate::schema;
use crate::store_err;
use crate::txn::SqliteStoreTxn;

/// SQLite-backed domain store
pub struct SqliteDomainStore {
    conn: Arc<Mutex<Connection>>,
    config: StoreConfig,
}

impl SqliteDomainStore {
    /// Open (or create) the store described by `cfg`
    pub fn open(cfg: StoreConfig) -> Result<Self> {
        if let Some(parent) = cfg.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            &cfg.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(store_err)?;

        Self::configure_connection(&conn, &cfg)?;
        schema::init_schema(&conn)?;

        tracing::debug!("Opened store at {}", cfg.path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config: cfg,
        })
    }

    fn configure_connection(conn: &Connection, cfg: &StoreConfig) -> Result<()> {
        if cfg.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| TindaError::Config(e.to_string()))?;
        }

        conn.pragma_update(None, "synchronous", cfg.synchronous.as_pragma())
            .map_err(|e| TindaError::Config(e.to_string()))?;

        conn.pragma_update(None, "foreign_keys", if cfg.foreign_keys { "ON" } else { "OFF" })
            .map_err(|e| TindaError::Config(e.to_string()))?;

        conn.pragma_update(None, "cache_size", cfg.cache_size)
            .map_err(|e| TindaError::Config(e.to_string()))?;

        Ok(())
    }

    /// Get the underlying connection (for migrations and custom queries)
    pub fn conn(&self) -> &Arc<Mutex<Connection>> {
        &self.conn
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Audit log sharing this store's connection
    pub fn audit_log(&self) -> SqliteAuditLog {
        SqliteAuditLog::new(self.conn.clone())
    }

    /// Insert rows outside of a restore, in their own transaction
    pub fn insert_rows(&self, table: TableName, rows: &[Row]) -> Result<u64> {
        let mut txn = self.begin_txn()?;
        let inserted = txn.bulk_insert(table, rows)?;
        txn.commit()?;
        Ok(inserted)
    }

    /// Number of rows in a table
    pub fn count(&self, table: TableName) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(store_err)?;
        Ok(count as u64)
    }

    /// Move the schema version forward (see [`schema::migrate`])
    pub fn migrate(&self, target_version: u32) -> Result<()> {
        let conn = self.conn.lock();
        schema::migrate(&conn, target_version)
    }
}

impl DomainStore for SqliteDomainStore {
    type Txn<'a> = SqliteStoreTxn<'a>;
    type Reader<'a> = SqliteStoreReader<'a>;

    fn read_all(&self, table: TableName) -> Result<Vec<Row>> {
        let conn = self.conn.lock();
        read::read_table(&conn, table)
    }

    fn schema_version(&self) -> Result<u32> {
        let conn = self.conn.lock();
        schema::schema_version(&conn)
    }

    fn begin_read(&self) -> Result<Self::Reader<'_>> {
        SqliteStoreReader::new(self.conn.lock())
    }

    fn begin_txn(&self) -> Result<Self::Txn<'_>> {
        SqliteStoreTxn::new(self.conn.lock())
    }
}
