use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row as SqlRow};
use std::sync::Arc;
use tinda_core::{ActionKind, ActorId, AuditLog, AuditRecord, Result, TindaError};

/// Audit log stored in the `backup` table
///
/// Shares the store's connection. Never appended to while a store
/// transaction is open on the same connection.
#[derive(Clone)]
pub struct SqliteAuditLog {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = "backup_id, user_id, username, backup_type, backup_name, created_at,
     schema_version, file_name, file_size, checksum, details";

impl SqliteAuditLog {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn decode(row: &SqlRow<'_>) -> rusqlite::Result<RawRecord> {
        Ok(RawRecord {
            id: row.get(0)?,
            actor_id: row.get(1)?,
            actor_name: row.get(2)?,
            action: row.get(3)?,
            label: row.get(4)?,
            created_at: row.get(5)?,
            schema_version: row.get(6)?,
            file_name: row.get(7)?,
            size_bytes: row.get(8)?,
            checksum: row.get(9)?,
            details: row.get(10)?,
        })
    }
}

struct RawRecord {
    id: i64,
    actor_id: String,
    actor_name: String,
    action: String,
    label: Option<String>,
    created_at: String,
    schema_version: Option<i64>,
    file_name: Option<String>,
    size_bytes: Option<i64>,
    checksum: Option<String>,
    details: Option<String>,
}

impl TryFrom<RawRecord> for AuditRecord {
    type Error = TindaError;

    fn try_from(raw: RawRecord) -> Result<Self> {
        let actor_id: ActorId = serde_json::from_str(&raw.actor_id)
            .map_err(|e| TindaError::Audit(format!("bad actor id '{}': {}", raw.actor_id, e)))?;
        let timestamp = DateTime::parse_from_rfc3339(&raw.created_at)
            .map_err(|e| TindaError::Audit(format!("bad timestamp '{}': {}", raw.created_at, e)))?
            .with_timezone(&Utc);
        let details = match raw.details {
            Some(text) => serde_json::from_str(&text)?,
            None => serde_json::Value::Null,
        };

        Ok(AuditRecord {
            id: Some(raw.id),
            actor_id,
            actor_name: raw.actor_name,
            action: raw.action.parse::<ActionKind>()?,
            timestamp,
            label: raw.label,
            file_name: raw.file_name,
            size_bytes: raw.size_bytes.map(|s| s as u64),
            checksum: raw.checksum,
            schema_version: raw.schema_version.map(|v| v as u32),
            details,
        })
    }
}

impl AuditLog for SqliteAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<i64> {
        let actor_id = serde_json::to_string(&record.actor_id)?;
        let details = if record.details.is_null() {
            None
        } else {
            Some(serde_json::to_string(&record.details)?)
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO backup (user_id, username, backup_type, backup_name, created_at,
                 schema_version, file_name, file_size, checksum, details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                actor_id,
                record.actor_name,
                record.action.as_str(),
                record.label,
                record.timestamp.to_rfc3339(),
                record.schema_version,
                record.file_name,
                record.size_bytes.map(|s| s as i64),
                record.checksum,
                details,
            ],
        )
        .map_err(|e| TindaError::Audit(e.to_string()))?;

        Ok(conn.last_insert_rowid())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let raws = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM backup ORDER BY backup_id DESC LIMIT ?1",
                    SELECT_COLUMNS
                ))
                .map_err(|e| TindaError::Audit(e.to_string()))?;

            let raws = stmt
                .query_map([limit as i64], Self::decode)
                .map_err(|e| TindaError::Audit(e.to_string()))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| TindaError::Audit(e.to_string()))?;
            raws
        };

        raws.into_iter().map(AuditRecord::try_from).collect()
    }

    fn count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM backup", [], |row| row.get(0))
            .map_err(|e| TindaError::Audit(e.to_string()))?;
        Ok(count as u64)
    }
}
