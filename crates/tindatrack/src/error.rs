use thiserror::Error;
use tinda_core::TindaError;

/// Why a backup could not be produced
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup name must not be empty")]
    EmptyLabel,

    #[error("No table could be read from the store")]
    NoTablesReadable,

    #[error("Failed to serialize backup: {0}")]
    Serialization(String),

    #[error("Store failure: {0}")]
    Store(#[source] TindaError),
}

/// Why a restore was refused or rolled back
///
/// Every variant leaves the store exactly as it was before the call.
#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Not a valid backup file: {0}")]
    MalformedDocument(String),

    #[error(
        "Schema version mismatch: store is at v{expected}, backup is v{found}. \
         Please use a backup from this version"
    )]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("Invalid or corrupted backup file (checksum mismatch)")]
    ChecksumMismatch { stored: String, computed: String },

    #[error("Store failure during restore, no changes were applied: {0}")]
    StoreFailure(#[source] TindaError),
}

impl RestoreError {
    /// Short machine-readable tag, used in audit details and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            RestoreError::MalformedDocument(_) => "malformed",
            RestoreError::SchemaMismatch { .. } => "schema_mismatch",
            RestoreError::ChecksumMismatch { .. } => "checksum_mismatch",
            RestoreError::StoreFailure(_) => "store_failure",
        }
    }
}

/// Failure of a scheduled daily backup
#[derive(Error, Debug)]
pub enum AutoBackupError {
    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error("Failed to write export: {0}")]
    Export(#[from] TindaError),
}
