//! Status command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tindatrack::prelude::*;

pub fn execute(db_path: PathBuf) -> Result<()> {
    tracing::info!("Checking database status: {}", db_path.display());

    let db = TindaDb::open(&db_path).context("Failed to open database")?;
    let status = db.status().context("Failed to read database status")?;

    println!("\nDatabase Status");
    println!("{}", "=".repeat(60));
    println!("Path: {}", db_path.display());
    println!("Schema Version: {}", status.schema_version);

    println!("\nTables:");
    for (table, rows) in &status.tables {
        println!("  {:<20} {:>10}", table.as_str(), rows);
    }
    println!("  {:<20} {:>10}", "total", status.total_rows());

    let last = db
        .audit()
        .recent(1)
        .context("Failed to read backup history")?;
    match last.first() {
        Some(record) => println!(
            "\nLast operation: {} by {} at {}",
            record.action,
            record.actor_name,
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("\nNo backups yet"),
    }

    Ok(())
}
