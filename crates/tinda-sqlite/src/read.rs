use parking_lot::MutexGuard;
use rusqlite::{types::ValueRef, Connection};
use tinda_core::{Result, Row, StoreReader, TableName, TindaError, Value};

use crate::schema;
use crate::store_err;

/// Read transaction over the whole database
///
/// Runs every read inside one `BEGIN DEFERRED` transaction, so all tables are
/// seen as of the first read. Writers on other connections are not blocked
/// in WAL mode; their commits simply stay invisible until the view ends.
pub struct SqliteStoreReader<'a> {
    conn: MutexGuard<'a, Connection>,
    in_txn: bool,
}

impl<'a> SqliteStoreReader<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Result<Self> {
        conn.execute("BEGIN DEFERRED TRANSACTION", [])
            .map_err(|e| TindaError::Transaction(e.to_string()))?;

        Ok(Self { conn, in_txn: true })
    }
}

impl<'a> StoreReader for SqliteStoreReader<'a> {
    fn schema_version(&mut self) -> Result<u32> {
        schema::schema_version(&self.conn)
    }

    fn read_all(&mut self, table: TableName) -> Result<Vec<Row>> {
        read_table(&self.conn, table)
    }

    fn finish(mut self) -> Result<()> {
        if self.in_txn {
            self.conn
                .execute("COMMIT", [])
                .map_err(|e| TindaError::Transaction(e.to_string()))?;
            self.in_txn = false;
        }
        Ok(())
    }
}

impl<'a> Drop for SqliteStoreReader<'a> {
    fn drop(&mut self) {
        if self.in_txn {
            let _ = self.conn.execute("ROLLBACK", []);
        }
    }
}

/// Every row of a table, ordered by primary key
pub(crate) fn read_table(conn: &Connection, table: TableName) -> Result<Vec<Row>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT * FROM {} ORDER BY {}",
            table,
            table.primary_key()
        ))
        .map_err(store_err)?;

    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query([]).map_err(store_err)?;
    let mut out = Vec::new();

    while let Some(sql_row) = rows.next().map_err(store_err)? {
        let mut row = Row::new();
        for (idx, name) in names.iter().enumerate() {
            let value = match sql_row.get_ref(idx).map_err(store_err)? {
                ValueRef::Null => Value::Null,
                ValueRef::Integer(i) => Value::Integer(i),
                ValueRef::Real(r) => Value::Real(r),
                ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                ValueRef::Blob(_) => {
                    return Err(TindaError::UnsupportedValue {
                        table,
                        column: name.clone(),
                        reason: "blob values cannot be exported".into(),
                    })
                }
            };
            row.insert(name.clone(), value);
        }
        out.push(row);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteDomainStore;
    use tempfile::TempDir;
    use tinda_core::{row, DomainStore, StoreConfig};

    fn open_pair(dir: &TempDir) -> (SqliteDomainStore, SqliteDomainStore) {
        let path = dir.path().join("pos.db");
        let reader = SqliteDomainStore::open(StoreConfig::new(path.clone())).unwrap();
        let writer = SqliteDomainStore::open(StoreConfig::new(path)).unwrap();
        (reader, writer)
    }

    #[test]
    fn test_view_ignores_later_commits() {
        let dir = TempDir::new().unwrap();
        let (store, other) = open_pair(&dir);
        store
            .insert_rows(TableName::Categories, &[row! { "category_id" => 1, "name" => "Drinks" }])
            .unwrap();

        let mut reader = store.begin_read().unwrap();
        assert_eq!(reader.read_all(TableName::Categories).unwrap().len(), 1);

        other
            .insert_rows(TableName::Categories, &[row! { "category_id" => 2, "name" => "Snacks" }])
            .unwrap();
        other
            .insert_rows(
                TableName::Products,
                &[row! { "product_id" => 1, "name" => "Chips", "category_id" => 2 }],
            )
            .unwrap();

        assert_eq!(reader.read_all(TableName::Categories).unwrap().len(), 1);
        assert!(reader.read_all(TableName::Products).unwrap().is_empty());
        reader.finish().unwrap();

        assert_eq!(store.count(TableName::Products).unwrap(), 1);
    }

    #[test]
    fn test_failed_read_keeps_view_usable() {
        let dir = TempDir::new().unwrap();
        let (store, _other) = open_pair(&dir);
        store
            .conn()
            .lock()
            .execute_batch("INSERT INTO categories (category_id, name) VALUES (1, x'00ff')")
            .unwrap();
        store
            .insert_rows(TableName::Suppliers, &[row! { "supplier_id" => 1, "name" => "Acme" }])
            .unwrap();

        let mut reader = store.begin_read().unwrap();
        let err = reader.read_all(TableName::Categories).unwrap_err();
        assert!(matches!(err, TindaError::UnsupportedValue { ref column, .. } if column == "name"));
        assert_eq!(reader.read_all(TableName::Suppliers).unwrap().len(), 1);
        assert_eq!(reader.schema_version().unwrap(), crate::SCHEMA_VERSION);
        reader.finish().unwrap();
    }

    #[test]
    fn test_dropped_view_releases_connection() {
        let dir = TempDir::new().unwrap();
        let (store, _other) = open_pair(&dir);
        {
            let mut reader = store.begin_read().unwrap();
            reader.read_all(TableName::Users).unwrap();
        }
        store
            .insert_rows(TableName::Users, &[row! { "user_id" => 1, "username" => "alice" }])
            .unwrap();
        assert_eq!(store.count(TableName::Users).unwrap(), 1);
    }
}
