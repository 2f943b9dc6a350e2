//! Writing backup documents to disk
//!
//! Exports land under their final name only once fully written: the document
//! goes to a hidden temporary file first, is synced, and is renamed into place.
//! The auto-backup marker is written the same way.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tinda_core::{Result, TindaError};

use crate::engine::BackupOutput;

/// Write a backup document into `dir`, returning the final path
pub fn write_export(dir: &Path, output: &BackupOutput) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let final_path = dir.join(&output.file_name);
    write_atomic(&final_path, output.document.as_bytes())?;

    tracing::info!("Wrote backup to {}", final_path.display());
    Ok(final_path)
}

/// Write `data` to a hidden sibling, flush it to disk, then rename over `path`
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| TindaError::InvalidState(format!("not a file path: {}", path.display())))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let written = File::create(&tmp_path).and_then(|mut f| {
        f.write_all(data)?;
        f.sync_all()
    });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Record of the last automatic backup, kept next to the exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastBackupMarker {
    /// UTC calendar day the backup ran
    pub date: NaiveDate,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// Reads and writes the `.last_auto_backup` marker file
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub const FILENAME: &'static str = ".last_auto_backup";

    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(Self::FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the marker; a missing file reads as `None`
    pub fn read(&self) -> Result<Option<LastBackupMarker>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let marker =
            serde_json::from_str(&json).map_err(|e| TindaError::Serialization(e.to_string()))?;
        Ok(Some(marker))
    }

    pub fn write(&self, marker: &LastBackupMarker) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(marker)?;
        write_atomic(&self.path, json.as_bytes())
    }
}
