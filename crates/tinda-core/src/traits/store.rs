use crate::error::Result;
use crate::types::{Row, TableName};

/// Write transaction spanning every domain table
///
/// Either everything done through the handle becomes visible on `commit`, or
/// nothing does. Dropping a handle without committing must roll back.
///
/// Note: Not required to be Send, as some backends have thread-affine transactions
pub trait StoreTxn {
    /// Delete every row of a table, returning the number removed
    fn clear(&mut self, table: TableName) -> Result<u64>;

    /// Insert rows into a table, returning the number inserted
    ///
    /// Rows are checked against the table's columns here; an unknown column
    /// fails the insert.
    fn bulk_insert(&mut self, table: TableName, rows: &[Row]) -> Result<u64>;

    /// Commit all changes made through this handle
    fn commit(self) -> Result<()>;

    /// Discard all changes made through this handle
    fn rollback(self);
}

/// Read handle over one consistent view of every domain table
///
/// Writes committed by others after the handle's first read are not visible
/// through it, so tables read through one handle agree with each other.
pub trait StoreReader {
    /// Schema version as of this view
    fn schema_version(&mut self) -> Result<u32>;

    /// Read every row of a table as of this view
    fn read_all(&mut self, table: TableName) -> Result<Vec<Row>>;

    /// Release the view
    fn finish(self) -> Result<()>;
}

/// Domain store: the relational tables of the shop
///
/// Provides:
/// - Full-table reads, singly or through a consistent read view
/// - Schema version reporting
/// - All-or-nothing multi-table write transactions
pub trait DomainStore: Send + Sync {
    type Txn<'a>: StoreTxn
    where
        Self: 'a;

    type Reader<'a>: StoreReader
    where
        Self: 'a;

    /// Tables held by the store, parents first
    fn list_tables(&self) -> Vec<TableName> {
        TableName::ALL.to_vec()
    }

    /// Read every row of a table
    fn read_all(&self, table: TableName) -> Result<Vec<Row>>;

    /// Current schema version
    fn schema_version(&self) -> Result<u32>;

    /// Open a read view spanning every table
    fn begin_read(&self) -> Result<Self::Reader<'_>>;

    /// Begin a write transaction with exclusive access to every table
    fn begin_txn(&self) -> Result<Self::Txn<'_>>;
}
