//! Restore command implementation

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use tindatrack::prelude::*;

pub fn execute(
    db_path: PathBuf,
    file: PathBuf,
    actor_id: &str,
    actor_name: Option<String>,
    force: bool,
) -> Result<()> {
    let db = TindaDb::open(&db_path).context("Failed to open database")?;

    if !force {
        print!(
            "⚠️  WARNING: Restoring {} replaces ALL current data in {}.\nContinue? [y/N] ",
            file.display(),
            db_path.display()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Restore cancelled");
            return Ok(());
        }
    }

    let report = db
        .engine()
        .restore_from_file(&file, actor_id, actor_name.as_deref())
        .with_context(|| format!("Failed to restore {}", file.display()))?;

    println!(
        "✓ Restored {} rows from backup taken {} by {}",
        report.total_rows(),
        report.snapshot_created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.snapshot_created_by_name
    );
    for (table, rows) in &report.rows_restored {
        println!("  {:<20} {:>10}", table.as_str(), rows);
    }

    Ok(())
}
