//! History command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tindatrack::prelude::*;

pub fn execute(db_path: PathBuf, limit: usize) -> Result<()> {
    let db = TindaDb::open(&db_path).context("Failed to open database")?;
    let records = db
        .audit()
        .recent(limit)
        .context("Failed to read backup history")?;

    if records.is_empty() {
        println!("No backup history");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<18} {:<12} {:>10}  {}",
        "ID", "Time (UTC)", "Action", "User", "Size", "Name"
    );
    println!("{}", "-".repeat(90));

    for record in records {
        let size = record
            .size_bytes
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<6} {:<20} {:<18} {:<12} {:>10}  {}",
            record.id.unwrap_or_default(),
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.action.as_str(),
            record.actor_name,
            size,
            record.label.as_deref().unwrap_or("-"),
        );
        if record.action.is_failure() {
            if let Some(error) = record.details.get("error").and_then(|e| e.as_str()) {
                println!("       ↳ {}", error);
            }
        }
    }

    Ok(())
}
