use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the domain store
///
/// Passed explicitly to whatever opens the store; nothing reads connection
/// targets from process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Enable WAL mode
    /// Default: true
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// SQLite synchronous mode
    #[serde(default)]
    pub synchronous: SynchronousMode,

    /// SQLite cache size (in pages, negative = KB)
    /// Default: -64000 (64MB)
    #[serde(default = "default_cache_size")]
    pub cache_size: i32,

    /// Enforce foreign keys between domain tables
    /// Default: true
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SynchronousMode {
    /// Full fsync (safest, slowest)
    Full,
    /// fsync at critical moments (good balance)
    #[default]
    Normal,
    /// No fsync (fastest, least safe)
    Off,
}

impl SynchronousMode {
    pub fn as_pragma(&self) -> &'static str {
        match self {
            SynchronousMode::Full => "FULL",
            SynchronousMode::Normal => "NORMAL",
            SynchronousMode::Off => "OFF",
        }
    }
}

fn default_wal_mode() -> bool {
    true
}

fn default_cache_size() -> i32 {
    -64000 // 64MB
}

fn default_foreign_keys() -> bool {
    true
}

impl StoreConfig {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            wal_mode: default_wal_mode(),
            synchronous: SynchronousMode::default(),
            cache_size: default_cache_size(),
            foreign_keys: default_foreign_keys(),
        }
    }

    pub fn with_synchronous(mut self, synchronous: SynchronousMode) -> Self {
        self.synchronous = synchronous;
        self
    }

    pub fn with_wal_mode(mut self, wal_mode: bool) -> Self {
        self.wal_mode = wal_mode;
        self
    }

    pub fn with_cache_size(mut self, cache_size: i32) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let cfg: StoreConfig = serde_json::from_str(r#"{"path": "pos.db"}"#).unwrap();
        assert!(cfg.wal_mode);
        assert!(cfg.foreign_keys);
        assert_eq!(cfg.synchronous, SynchronousMode::Normal);
        assert_eq!(cfg.cache_size, -64000);
    }

    #[test]
    fn test_builders() {
        let cfg = StoreConfig::new(PathBuf::from("pos.db"))
            .with_wal_mode(false)
            .with_synchronous(SynchronousMode::Full)
            .with_foreign_keys(false);
        assert!(!cfg.wal_mode);
        assert!(!cfg.foreign_keys);
        assert_eq!(cfg.synchronous.as_pragma(), "FULL");
    }
}
