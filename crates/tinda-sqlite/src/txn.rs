use parking_lot::MutexGuard;
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection};
use std::collections::{HashMap, HashSet};
use tinda_core::{Result, Row, StoreTxn, TableName, TindaError, Value};

use crate::store_err;

/// Write transaction over the whole database
///
/// Holds the connection lock for its lifetime, so no other reader or writer
/// on this store interleaves with it. Dropped without `commit` it rolls back.
pub struct SqliteStoreTxn<'a> {
    conn: MutexGuard<'a, Connection>,
    in_txn: bool,
    columns: HashMap<TableName, HashSet<String>>,
}

impl<'a> SqliteStoreTxn<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Result<Self> {
        conn.execute("BEGIN IMMEDIATE TRANSACTION", [])
            .map_err(|e| TindaError::Transaction(e.to_string()))?;

        Ok(Self {
            conn,
            in_txn: true,
            columns: HashMap::new(),
        })
    }

    /// Column names of a table, cached for the life of the transaction
    fn columns(&mut self, table: TableName) -> Result<&HashSet<String>> {
        if !self.columns.contains_key(&table) {
            let cols = table_columns(&self.conn, table)?;
            self.columns.insert(table, cols);
        }
        Ok(&self.columns[&table])
    }

    fn insert_row(&mut self, table: TableName, row: &Row) -> Result<()> {
        let columns = self.columns(table)?;
        if let Some(unknown) = row.keys().find(|c| !columns.contains(*c)) {
            return Err(TindaError::UnknownColumn {
                table,
                column: unknown.clone(),
            });
        }

        if row.is_empty() {
            self.conn
                .execute(&format!("INSERT INTO {} DEFAULT VALUES", table), [])
                .map_err(store_err)?;
            return Ok(());
        }

        let names: Vec<&str> = row.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            names.join(", "),
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare_cached(&sql).map_err(store_err)?;
        stmt.execute(params_from_iter(row.values().map(to_sql)))
            .map_err(|e| TindaError::Store(format!("insert into {} failed: {}", table, e)))?;
        Ok(())
    }
}

impl<'a> StoreTxn for SqliteStoreTxn<'a> {
    fn clear(&mut self, table: TableName) -> Result<u64> {
        let removed = self
            .conn
            .execute(&format!("DELETE FROM {}", table), [])
            .map_err(|e| TindaError::Store(format!("clear {} failed: {}", table, e)))?;
        Ok(removed as u64)
    }

    fn bulk_insert(&mut self, table: TableName, rows: &[Row]) -> Result<u64> {
        for row in rows {
            self.insert_row(table, row)?;
        }
        Ok(rows.len() as u64)
    }

    fn commit(mut self) -> Result<()> {
        if self.in_txn {
            self.conn
                .execute("COMMIT", [])
                .map_err(|e| TindaError::Transaction(e.to_string()))?;
            self.in_txn = false;
        }
        Ok(())
    }

    fn rollback(mut self) {
        if self.in_txn {
            let _ = self.conn.execute("ROLLBACK", []);
            self.in_txn = false;
        }
    }
}

impl<'a> Drop for SqliteStoreTxn<'a> {
    fn drop(&mut self) {
        if self.in_txn {
            tracing::debug!("Rolling back uncommitted store transaction");
            let _ = self.conn.execute("ROLLBACK", []);
        }
    }
}

pub(crate) fn table_columns(conn: &Connection, table: TableName) -> Result<HashSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(store_err)?;
    let cols = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(store_err)?
        .collect::<rusqlite::Result<HashSet<_>>>()
        .map_err(store_err)?;

    if cols.is_empty() {
        return Err(TindaError::Store(format!("no such table: {}", table)));
    }
    Ok(cols)
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::init_schema;
    use parking_lot::Mutex;
    use tinda_core::row;

    fn conn() -> Mutex<Connection> {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        Mutex::new(conn)
    }

    fn count(conn: &Mutex<Connection>, table: &str) -> i64 {
        conn.lock()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_commit_persists() {
        let conn = conn();
        let mut txn = SqliteStoreTxn::new(conn.lock()).unwrap();
        let n = txn
            .bulk_insert(
                TableName::Categories,
                &[row! { "category_id" => 1, "name" => "Drinks" }, row! { "name" => "Snacks" }],
            )
            .unwrap();
        assert_eq!(n, 2);
        txn.commit().unwrap();
        assert_eq!(count(&conn, "categories"), 2);
    }

    #[test]
    fn test_drop_rolls_back() {
        let conn = conn();
        {
            let mut txn = SqliteStoreTxn::new(conn.lock()).unwrap();
            txn.bulk_insert(TableName::Categories, &[row! { "name" => "Drinks" }])
                .unwrap();
        }
        assert_eq!(count(&conn, "categories"), 0);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let conn = conn();
        let mut txn = SqliteStoreTxn::new(conn.lock()).unwrap();
        let err = txn
            .bulk_insert(TableName::Categories, &[row! { "colour" => "red" }])
            .unwrap_err();
        assert!(matches!(err, TindaError::UnknownColumn { .. }));
        txn.rollback();
    }

    #[test]
    fn test_clear_reports_removed_rows() {
        let conn = conn();
        let mut txn = SqliteStoreTxn::new(conn.lock()).unwrap();
        txn.bulk_insert(
            TableName::Suppliers,
            &[row! { "name" => "A" }, row! { "name" => "B" }, row! {}],
        )
        .unwrap();
        assert_eq!(txn.clear(TableName::Suppliers).unwrap(), 3);
        txn.commit().unwrap();
        assert_eq!(count(&conn, "suppliers"), 0);
    }
}
