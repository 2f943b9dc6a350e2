use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ActorId;
use crate::error::TindaError;

/// Kind of backup/restore lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    BackupCreated,
    BackupFailed,
    RestoreCompleted,
    RestoreFailed,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::BackupCreated => "BACKUP_CREATED",
            ActionKind::BackupFailed => "BACKUP_FAILED",
            ActionKind::RestoreCompleted => "RESTORE_COMPLETED",
            ActionKind::RestoreFailed => "RESTORE_FAILED",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ActionKind::BackupFailed | ActionKind::RestoreFailed)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = TindaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BACKUP_CREATED" => Ok(ActionKind::BackupCreated),
            "BACKUP_FAILED" => Ok(ActionKind::BackupFailed),
            "RESTORE_COMPLETED" => Ok(ActionKind::RestoreCompleted),
            "RESTORE_FAILED" => Ok(ActionKind::RestoreFailed),
            other => Err(TindaError::Audit(format!("Unknown action kind: {}", other))),
        }
    }
}

/// One row of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Assigned by the audit log on append
    pub id: Option<i64>,
    pub actor_id: ActorId,
    pub actor_name: String,
    pub action: ActionKind,
    pub timestamp: DateTime<Utc>,
    /// Backup label, or the restored document name
    pub label: Option<String>,
    pub file_name: Option<String>,
    pub size_bytes: Option<u64>,
    pub checksum: Option<String>,
    pub schema_version: Option<u32>,
    /// Free-form details (error reason, provenance, row counts)
    pub details: serde_json::Value,
}

impl AuditRecord {
    pub fn new(actor_id: ActorId, actor_name: impl Into<String>, action: ActionKind) -> Self {
        Self {
            id: None,
            actor_id,
            actor_name: actor_name.into(),
            action,
            timestamp: Utc::now(),
            label: None,
            file_name: None,
            size_bytes: None,
            checksum: None,
            schema_version: None,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_file(mut self, file_name: impl Into<String>, size_bytes: u64) -> Self {
        self.file_name = Some(file_name.into());
        self.size_bytes = Some(size_bytes);
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = Some(version);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_wire_names() {
        for kind in [
            ActionKind::BackupCreated,
            ActionKind::BackupFailed,
            ActionKind::RestoreCompleted,
            ActionKind::RestoreFailed,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
        assert!("AUDIT_VIEW".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_builder() {
        let record = AuditRecord::new(ActorId::Id(7), "owner", ActionKind::BackupCreated)
            .with_label("Nightly")
            .with_file("TindaTrack_Backup_Nightly_1.json", 2048)
            .with_checksum("deadbeef")
            .with_schema_version(1);

        assert_eq!(record.label.as_deref(), Some("Nightly"));
        assert_eq!(record.size_bytes, Some(2048));
        assert_eq!(record.schema_version, Some(1));
        assert!(record.id.is_none());
        assert!(!record.action.is_failure());
    }
}
