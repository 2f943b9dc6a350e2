use crate::error::Result;
use crate::types::AuditRecord;

/// Append-only trail of backup and restore actions
pub trait AuditLog: Send + Sync {
    /// Append a record, returning its assigned id
    fn append(&self, record: &AuditRecord) -> Result<i64>;

    /// Most recent records, newest first
    fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>>;

    /// Total number of records
    fn count(&self) -> Result<u64>;
}
