//! Init command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tindatrack::prelude::*;

pub fn execute(db_path: PathBuf) -> Result<()> {
    let existed = db_path.exists();
    let db = TindaDb::open(&db_path).context("Failed to open database")?;
    let version = db
        .store()
        .schema_version()
        .context("Failed to get schema version")?;

    if existed {
        println!(
            "Database already initialized at {} (schema v{})",
            db_path.display(),
            version
        );
    } else {
        println!(
            "✓ Created database at {} (schema v{})",
            db_path.display(),
            version
        );
    }

    Ok(())
}
