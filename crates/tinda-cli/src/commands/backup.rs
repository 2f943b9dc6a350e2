//! Backup command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tindatrack::prelude::*;

pub fn execute(
    db_path: PathBuf,
    label: &str,
    actor_id: &str,
    actor_name: Option<String>,
    out_dir: PathBuf,
) -> Result<()> {
    let db = TindaDb::open(&db_path).context("Failed to open database")?;

    let output = db
        .engine()
        .create_backup(actor_id, actor_name.as_deref(), label)
        .context("Backup failed")?;

    let path = write_export(&out_dir, &output).context("Failed to write backup file")?;

    for table in &output.skipped_tables {
        println!("⚠️  Table {} could not be read and was exported empty", table);
    }
    println!("✓ Backup written to {}", path.display());
    println!("  Size:     {} bytes", output.size_bytes);
    println!("  Schema:   v{}", output.schema_version);
    println!("  Checksum: {}", output.checksum);

    Ok(())
}
