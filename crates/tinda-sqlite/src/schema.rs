use rusqlite::Connection;
use tinda_core::{Result, TindaError};

use crate::store_err;

/// Schema version written by [`init_schema`] on a fresh database
pub const SCHEMA_VERSION: u32 = 1;

const DOMAIN_TABLES: &str = "
CREATE TABLE IF NOT EXISTS users (
  user_id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT UNIQUE,
  password_hash TEXT,
  role TEXT,
  full_name TEXT,
  store_name TEXT
);

CREATE TABLE IF NOT EXISTS suppliers (
  supplier_id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT,
  contact_info TEXT,
  address TEXT
);

CREATE TABLE IF NOT EXISTS categories (
  category_id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT UNIQUE
);

CREATE TABLE IF NOT EXISTS products (
  product_id INTEGER PRIMARY KEY AUTOINCREMENT,
  sku TEXT UNIQUE,
  name TEXT,
  description TEXT,
  unit_price REAL,
  supplier_id INTEGER REFERENCES suppliers(supplier_id),
  base_unit TEXT,
  category_id INTEGER REFERENCES categories(category_id)
);

CREATE TABLE IF NOT EXISTS product_units (
  unit_id INTEGER PRIMARY KEY AUTOINCREMENT,
  product_id INTEGER REFERENCES products(product_id),
  unit_name TEXT,
  conversion_factor REAL,
  price_per_unit REAL
);

CREATE TABLE IF NOT EXISTS inventory (
  inventory_id INTEGER PRIMARY KEY AUTOINCREMENT,
  product_id INTEGER UNIQUE REFERENCES products(product_id),
  supplier_id INTEGER REFERENCES suppliers(supplier_id),
  quantity REAL DEFAULT 0,
  expiration_date TEXT,
  threshold REAL DEFAULT 5
);

CREATE TABLE IF NOT EXISTS resupplied_items (
  resupplied_items_id INTEGER PRIMARY KEY AUTOINCREMENT,
  product_id INTEGER REFERENCES products(product_id),
  user_id INTEGER REFERENCES users(user_id),
  supplier_id INTEGER REFERENCES suppliers(supplier_id),
  quantity REAL,
  unit_cost REAL,
  resupply_date TEXT DEFAULT CURRENT_TIMESTAMP,
  expiration_date TEXT
);

CREATE TABLE IF NOT EXISTS sales (
  sales_id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER REFERENCES users(user_id),
  sales_date TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS sale_items (
  sales_items_id INTEGER PRIMARY KEY AUTOINCREMENT,
  sales_id INTEGER REFERENCES sales(sales_id),
  product_id INTEGER REFERENCES products(product_id),
  quantity REAL,
  amount REAL,
  total_amount REAL,
  stockout_reason TEXT
);

CREATE TABLE IF NOT EXISTS stock_card (
  stock_card_id INTEGER PRIMARY KEY AUTOINCREMENT,
  product_id INTEGER REFERENCES products(product_id),
  supplier_id INTEGER REFERENCES suppliers(supplier_id),
  user_id INTEGER REFERENCES users(user_id),
  quantity REAL,
  unit_cost REAL,
  unit_price REAL,
  resupply_date TEXT,
  expiration_date TEXT,
  sales_id INTEGER REFERENCES sales(sales_id),
  sale_items_id INTEGER REFERENCES sale_items(sales_items_id),
  transaction_type TEXT,
  running_balance REAL,
  timestamp TEXT DEFAULT CURRENT_TIMESTAMP
);
";

// Actor ids are opaque (placeholder ids are allowed), so no foreign key to users.
const AUDIT_TABLE: &str = "
CREATE TABLE IF NOT EXISTS backup (
  backup_id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id TEXT NOT NULL,
  username TEXT NOT NULL,
  backup_type TEXT NOT NULL,
  backup_name TEXT,
  created_at TEXT NOT NULL,
  schema_version INTEGER,
  file_name TEXT,
  file_size INTEGER,
  checksum TEXT,
  details TEXT
);

CREATE INDEX IF NOT EXISTS idx_backup_created_at ON backup(created_at);
";

/// Create metadata, domain and audit tables if missing
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS store_meta (
            id INTEGER PRIMARY KEY CHECK (id = 0),
            schema_version INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )
    .map_err(store_err)?;

    conn.execute(
        "INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (0, ?1)",
        [SCHEMA_VERSION as i64],
    )
    .map_err(store_err)?;

    conn.execute_batch(DOMAIN_TABLES).map_err(store_err)?;
    conn.execute_batch(AUDIT_TABLE).map_err(store_err)?;

    Ok(())
}

/// Read the schema version from metadata
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn
        .query_row(
            "SELECT schema_version FROM store_meta WHERE id = 0",
            [],
            |row| row.get(0),
        )
        .map_err(store_err)?;

    Ok(version as u32)
}

/// Move the schema version forward
///
/// Applies no DDL itself; callers run their own statements first and then
/// record the new version here. Downgrades are refused.
pub fn migrate(conn: &Connection, target_version: u32) -> Result<()> {
    let current_version = schema_version(conn)?;

    if target_version < current_version {
        return Err(TindaError::InvalidState(format!(
            "Cannot downgrade schema version from {} to {}",
            current_version, target_version
        )));
    }

    if current_version == target_version {
        return Ok(());
    }

    update_schema_version(conn, target_version)?;
    tracing::info!(
        "Schema version moved from {} to {}",
        current_version,
        target_version
    );
    Ok(())
}

fn update_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "UPDATE store_meta SET schema_version = ?1, updated_at = datetime('now') WHERE id = 0",
        [version as i64],
    )
    .map_err(store_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_init_is_idempotent() {
        let conn = fresh();
        init_schema(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_every_table_exists() {
        let conn = fresh();
        for table in tinda_core::TableName::ALL {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table.as_str()],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_migrate_forward_only() {
        let conn = fresh();
        migrate(&conn, 3).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 3);
        migrate(&conn, 3).unwrap();
        assert!(migrate(&conn, 2).is_err());
    }
}
