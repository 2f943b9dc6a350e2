use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{Row, TableName};

/// Identifier of the user who triggered an action.
///
/// Existing exports carry either a numeric user id or an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActorId {
    Id(i64),
    Name(String),
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Id(id) => write!(f, "{}", id),
            ActorId::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ActorId {
    fn from(id: i64) -> Self {
        ActorId::Id(id)
    }
}

impl From<i32> for ActorId {
    fn from(id: i32) -> Self {
        ActorId::Id(id as i64)
    }
}

impl From<&str> for ActorId {
    fn from(name: &str) -> Self {
        name.parse::<i64>()
            .map(ActorId::Id)
            .unwrap_or_else(|_| ActorId::Name(name.to_string()))
    }
}

/// Point-in-time capture of every table, as written to an export document.
///
/// ```json
/// {
///   "schemaVersion": 1,
///   "createdAt": "2026-10-16T08:00:00Z",
///   "createdBy": 1,
///   "createdByName": "alice",
///   "tables": { "products": [ { "product_id": 1, "name": "Coke" } ] },
///   "checksum": "9f86d0…"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub created_by: ActorId,
    #[serde(default)]
    pub created_by_name: String,
    pub tables: BTreeMap<TableName, Vec<Row>>,
    pub checksum: String,
}

/// Everything in a [`Snapshot`] except its checksum.
///
/// Serializes with the same field names and order as the snapshot, so the
/// checksum can be computed over it without cloning the tables.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotBody<'a> {
    pub schema_version: u32,
    pub created_at: &'a DateTime<Utc>,
    pub created_by: &'a ActorId,
    pub created_by_name: &'a str,
    pub tables: &'a BTreeMap<TableName, Vec<Row>>,
}

impl Snapshot {
    pub fn body(&self) -> SnapshotBody<'_> {
        SnapshotBody {
            schema_version: self.schema_version,
            created_at: &self.created_at,
            created_by: &self.created_by,
            created_by_name: &self.created_by_name,
            tables: &self.tables,
        }
    }

    /// Rows for a table; absent tables read as empty.
    pub fn rows(&self, table: TableName) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }
}
