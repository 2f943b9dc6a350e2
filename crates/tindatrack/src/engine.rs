//! Backup creation and atomic restore
//!
//! # Example
//!
//! ```no_run
//! use tindatrack::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let db = TindaDb::open("./tindatrack.db")?;
//!
//! // Snapshot every table into a checksummed JSON document
//! let output = db.engine().create_backup(1, Some("alice"), "End of day")?;
//! std::fs::write(&output.file_name, &output.document)?;
//!
//! // Replace every table with the snapshot's content, all or nothing
//! let report = db.engine().restore_backup(&output.document, 1, Some("alice"))?;
//! println!("restored {} rows", report.total_rows());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tinda_core::{
    observe, ActionKind, ActorId, AuditLog, AuditRecord, BackupConfig, DomainStore, Snapshot,
    StoreReader, StoreTxn, TableName,
};

use crate::checksum;
use crate::error::{BackupError, RestoreError};
use crate::naming;

/// A serialized snapshot ready to be handed to the caller
#[derive(Debug, Clone)]
pub struct BackupOutput {
    /// The JSON document
    pub document: String,
    /// Suggested export file name
    pub file_name: String,
    pub size_bytes: u64,
    pub checksum: String,
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    /// Tables that could not be read and were exported empty
    pub skipped_tables: Vec<TableName>,
}

/// Outcome of a successful restore
#[derive(Debug, Clone)]
pub struct RestoreReport {
    /// Rows inserted per table; tables absent from the snapshot report 0
    pub rows_restored: BTreeMap<TableName, u64>,
    pub schema_version: u32,
    pub checksum: String,
    pub snapshot_created_at: DateTime<Utc>,
    pub snapshot_created_by: ActorId,
    pub snapshot_created_by_name: String,
}

impl RestoreReport {
    pub fn total_rows(&self) -> u64 {
        self.rows_restored.values().sum()
    }
}

/// Backup/restore engine over a domain store and an audit log
///
/// Holds no snapshot state between calls. Every call appends exactly one
/// audit record describing its outcome.
pub struct BackupEngine<S: DomainStore, A: AuditLog> {
    store: Arc<S>,
    audit: Arc<A>,
    config: BackupConfig,
}

impl<S: DomainStore, A: AuditLog> BackupEngine<S, A> {
    pub fn new(store: Arc<S>, audit: Arc<A>, config: BackupConfig) -> Self {
        Self {
            store,
            audit,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn audit(&self) -> &Arc<A> {
        &self.audit
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    fn actor_name(&self, name: Option<&str>) -> String {
        match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => self.config.default_actor_name.clone(),
        }
    }

    /// Snapshot every table into a checksummed JSON document.
    ///
    /// A table that cannot be read is exported empty; the call fails only if
    /// no table at all could be read. Domain tables are never modified.
    pub fn create_backup(
        &self,
        actor_id: impl Into<ActorId>,
        actor_name: Option<&str>,
        label: &str,
    ) -> Result<BackupOutput, BackupError> {
        let started = Instant::now();
        let actor_id = actor_id.into();
        let actor_name = self.actor_name(actor_name);
        let label = label.trim();

        match self.build_backup(&actor_id, &actor_name, label) {
            Ok(output) => {
                let record = AuditRecord::new(actor_id, actor_name, ActionKind::BackupCreated)
                    .with_label(label)
                    .with_file(output.file_name.clone(), output.size_bytes)
                    .with_checksum(output.checksum.clone())
                    .with_schema_version(output.schema_version)
                    .with_details(json!({
                        "skipped_tables": output.skipped_tables,
                    }));
                self.audit.append(&record).map_err(BackupError::Store)?;

                observe::record_backup(started.elapsed(), Some(output.size_bytes));
                tracing::info!(
                    "Backup {} created ({} bytes, {} tables skipped)",
                    output.file_name,
                    output.size_bytes,
                    output.skipped_tables.len()
                );
                Ok(output)
            }
            Err(e) => {
                let record = AuditRecord::new(actor_id, actor_name, ActionKind::BackupFailed)
                    .with_label(label)
                    .with_details(json!({ "error": e.to_string() }));
                self.append_failure(&record);

                observe::record_backup(started.elapsed(), None);
                tracing::warn!("Backup '{}' failed: {}", label, e);
                Err(e)
            }
        }
    }

    fn build_backup(
        &self,
        actor_id: &ActorId,
        actor_name: &str,
        label: &str,
    ) -> Result<BackupOutput, BackupError> {
        if label.is_empty() {
            return Err(BackupError::EmptyLabel);
        }

        let tables_to_read = self.store.list_tables();
        let mut tables = BTreeMap::new();
        let mut skipped_tables = Vec::new();

        // One read view for every table, so the snapshot is a single point in time
        let mut reader = self.store.begin_read().map_err(BackupError::Store)?;
        let schema_version = reader.schema_version().map_err(BackupError::Store)?;

        for table in &tables_to_read {
            match reader.read_all(*table) {
                Ok(rows) => {
                    tracing::debug!("Read {} rows from {}", rows.len(), table);
                    tables.insert(*table, rows);
                }
                Err(e) => {
                    tracing::warn!("Table {} could not be read, exporting it empty: {}", table, e);
                    observe::record_table_read_failure(table.as_str());
                    skipped_tables.push(*table);
                    tables.insert(*table, Vec::new());
                }
            }
        }
        reader.finish().map_err(BackupError::Store)?;

        if skipped_tables.len() == tables_to_read.len() {
            return Err(BackupError::NoTablesReadable);
        }

        let mut snapshot = Snapshot {
            schema_version,
            created_at: Utc::now(),
            created_by: actor_id.clone(),
            created_by_name: actor_name.to_string(),
            tables,
            checksum: String::new(),
        };
        checksum::seal(&mut snapshot).map_err(|e| BackupError::Serialization(e.to_string()))?;

        let document = if self.config.pretty {
            serde_json::to_string_pretty(&snapshot)
        } else {
            serde_json::to_string(&snapshot)
        }
        .map_err(|e| BackupError::Serialization(e.to_string()))?;

        let file_name = naming::document_name(
            &self.config.app_name,
            label,
            snapshot.created_at.timestamp_millis(),
        );

        Ok(BackupOutput {
            size_bytes: document.len() as u64,
            document,
            file_name,
            checksum: snapshot.checksum,
            schema_version,
            created_at: snapshot.created_at,
            skipped_tables,
        })
    }

    /// Replace every domain table with the content of a backup document.
    ///
    /// Validation runs in order (shape, schema version, checksum) and stops at
    /// the first failure. The replacement itself is one store transaction:
    /// on any error nothing is changed. The audit table is left untouched and
    /// any audit rows carried by the document are ignored.
    pub fn restore_backup(
        &self,
        document: &str,
        actor_id: impl Into<ActorId>,
        actor_name: Option<&str>,
    ) -> Result<RestoreReport, RestoreError> {
        self.restore_inner(Ok(document), None, actor_id.into(), actor_name)
    }

    /// Like [`restore_backup`](Self::restore_backup), reading the document
    /// from a file. The file name is recorded in the audit trail.
    pub fn restore_from_file(
        &self,
        path: impl AsRef<Path>,
        actor_id: impl Into<ActorId>,
        actor_name: Option<&str>,
    ) -> Result<RestoreReport, RestoreError> {
        let path = path.as_ref();
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match std::fs::read_to_string(path) {
            Ok(document) => self.restore_inner(
                Ok(document.as_str()),
                Some(source.as_str()),
                actor_id.into(),
                actor_name,
            ),
            Err(e) => self.restore_inner(
                Err(RestoreError::MalformedDocument(format!("cannot read {}: {}", source, e))),
                Some(source.as_str()),
                actor_id.into(),
                actor_name,
            ),
        }
    }

    fn restore_inner(
        &self,
        document: Result<&str, RestoreError>,
        source: Option<&str>,
        actor_id: ActorId,
        actor_name: Option<&str>,
    ) -> Result<RestoreReport, RestoreError> {
        let started = Instant::now();
        let actor_name = self.actor_name(actor_name);
        let size_bytes = document.as_ref().map(|d| d.len() as u64).unwrap_or(0);

        tracing::info!("Restore requested by {} ({})", actor_name, actor_id);

        let result = document.and_then(|doc| self.validate_and_replace(doc));

        let mut record = match &result {
            Ok(report) => AuditRecord::new(actor_id, actor_name.clone(), ActionKind::RestoreCompleted)
                .with_checksum(report.checksum.clone())
                .with_schema_version(report.schema_version)
                .with_details(json!({
                    "original_backup_date": report.snapshot_created_at,
                    "original_backup_by": report.snapshot_created_by,
                    "original_backup_by_name": report.snapshot_created_by_name,
                    "restored_by": actor_name,
                    "rows_restored": report.rows_restored,
                })),
            Err(e) => AuditRecord::new(actor_id, actor_name.clone(), ActionKind::RestoreFailed)
                .with_details(json!({
                    "reason": e.kind(),
                    "error": e.to_string(),
                })),
        };
        if let Some(source) = source {
            record = record
                .with_label(format!("Restore Operation - {}", source))
                .with_file(source, size_bytes);
        }

        match result {
            Ok(report) => {
                // The restore is committed; a lost audit row must not report it as failed.
                if let Err(e) = self.audit.append(&record) {
                    tracing::error!("Restore committed but audit append failed: {}", e);
                }
                observe::record_restore(started.elapsed(), "ok");
                tracing::info!(
                    "Restore complete: {} rows across {} tables (snapshot from {} by {})",
                    report.total_rows(),
                    report.rows_restored.len(),
                    report.snapshot_created_at,
                    report.snapshot_created_by_name
                );
                Ok(report)
            }
            Err(e) => {
                self.append_failure(&record);
                observe::record_restore(started.elapsed(), e.kind());
                tracing::warn!("Restore rejected: {}", e);
                Err(e)
            }
        }
    }

    fn validate_and_replace(&self, document: &str) -> Result<RestoreReport, RestoreError> {
        let snapshot: Snapshot = serde_json::from_str(document)
            .map_err(|e| RestoreError::MalformedDocument(e.to_string()))?;

        let expected = self
            .store
            .schema_version()
            .map_err(RestoreError::StoreFailure)?;
        if snapshot.schema_version != expected {
            return Err(RestoreError::SchemaMismatch {
                expected,
                found: snapshot.schema_version,
            });
        }

        checksum::verify(&snapshot)
            .map_err(|e| RestoreError::MalformedDocument(e.to_string()))?
            .map_err(|computed| RestoreError::ChecksumMismatch {
                stored: snapshot.checksum.clone(),
                computed,
            })?;

        let audit_rows = snapshot.rows(TableName::Backup).len();
        if audit_rows > 0 {
            tracing::debug!("Ignoring {} audit rows carried by the snapshot", audit_rows);
        }

        let rows_restored = self
            .replace_all(&snapshot)
            .map_err(RestoreError::StoreFailure)?;

        Ok(RestoreReport {
            rows_restored,
            schema_version: snapshot.schema_version,
            checksum: snapshot.checksum,
            snapshot_created_at: snapshot.created_at,
            snapshot_created_by: snapshot.created_by,
            snapshot_created_by_name: snapshot.created_by_name,
        })
    }

    fn replace_all(&self, snapshot: &Snapshot) -> tinda_core::Result<BTreeMap<TableName, u64>> {
        let mut tables: Vec<TableName> = self
            .store
            .list_tables()
            .into_iter()
            .filter(|t| !t.is_audit())
            .collect();
        tables.sort();

        let mut txn = self.store.begin_txn()?;
        match apply_snapshot(&mut txn, &tables, snapshot) {
            Ok(counts) => {
                txn.commit()?;
                Ok(counts)
            }
            Err(e) => {
                tracing::warn!("Rolling back restore: {}", e);
                txn.rollback();
                Err(e)
            }
        }
    }

    fn append_failure(&self, record: &AuditRecord) {
        if let Err(e) = self.audit.append(record) {
            tracing::error!("Failed to record {} in audit log: {}", record.action, e);
        }
    }
}

/// Clear children before parents, then insert parents before children.
fn apply_snapshot<T: StoreTxn>(
    txn: &mut T,
    tables: &[TableName],
    snapshot: &Snapshot,
) -> tinda_core::Result<BTreeMap<TableName, u64>> {
    if let Some(unknown) = snapshot
        .tables
        .keys()
        .find(|t| !t.is_audit() && !tables.contains(*t))
    {
        return Err(tinda_core::TindaError::InvalidState(format!(
            "Snapshot contains table {} which the store does not hold",
            unknown
        )));
    }

    for table in tables.iter().rev() {
        let removed = txn.clear(*table)?;
        tracing::debug!("Cleared {} rows from {}", removed, table);
    }

    let mut counts = BTreeMap::new();
    for table in tables {
        let inserted = txn.bulk_insert(*table, snapshot.rows(*table))?;
        counts.insert(*table, inserted);
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinda_core::{row, Row};

    #[derive(Default)]
    struct RecordingTxn {
        ops: Vec<String>,
    }

    impl StoreTxn for RecordingTxn {
        fn clear(&mut self, table: TableName) -> tinda_core::Result<u64> {
            self.ops.push(format!("clear {}", table));
            Ok(0)
        }

        fn bulk_insert(&mut self, table: TableName, rows: &[Row]) -> tinda_core::Result<u64> {
            self.ops.push(format!("insert {}", table));
            Ok(rows.len() as u64)
        }

        fn commit(self) -> tinda_core::Result<()> {
            Ok(())
        }

        fn rollback(self) {}
    }

    fn snapshot(tables: BTreeMap<TableName, Vec<Row>>) -> Snapshot {
        Snapshot {
            schema_version: 1,
            created_at: Utc::now(),
            created_by: ActorId::Id(1),
            created_by_name: "alice".into(),
            tables,
            checksum: String::new(),
        }
    }

    #[test]
    fn test_clears_children_first_and_inserts_parents_first() {
        let tables = [TableName::Categories, TableName::Products, TableName::Inventory];
        let mut content = BTreeMap::new();
        content.insert(TableName::Products, vec![row! { "product_id" => 1 }]);

        let mut txn = RecordingTxn::default();
        let counts = apply_snapshot(&mut txn, &tables, &snapshot(content)).unwrap();

        assert_eq!(
            txn.ops,
            vec![
                "clear inventory",
                "clear products",
                "clear categories",
                "insert categories",
                "insert products",
                "insert inventory",
            ]
        );
        assert_eq!(counts[&TableName::Products], 1);
        assert_eq!(counts[&TableName::Categories], 0);
    }

    #[test]
    fn test_table_outside_store_is_rejected_before_any_write() {
        let mut content = BTreeMap::new();
        content.insert(TableName::Sales, vec![]);

        let mut txn = RecordingTxn::default();
        let err = apply_snapshot(&mut txn, &[TableName::Products], &snapshot(content));

        assert!(matches!(err, Err(tinda_core::TindaError::InvalidState(_))));
        assert!(txn.ops.is_empty());
    }

    #[test]
    fn test_audit_rows_in_snapshot_are_ignored() {
        let mut content = BTreeMap::new();
        content.insert(TableName::Backup, vec![row! { "backup_id" => 1 }]);

        let mut txn = RecordingTxn::default();
        apply_snapshot(&mut txn, &[TableName::Products], &snapshot(content)).unwrap();
        assert_eq!(txn.ops, vec!["clear products", "insert products"]);
    }
}
