use serde::{Deserialize, Serialize};

/// Configuration for the backup engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Application name used as the prefix of export file names
    /// Default: "TindaTrack"
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Actor name recorded when the caller does not supply one
    /// Default: "System"
    #[serde(default = "default_actor_name")]
    pub default_actor_name: String,

    /// Pretty-print exported documents
    /// Default: true
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_app_name() -> String {
    "TindaTrack".to_string()
}

fn default_actor_name() -> String {
    "System".to_string()
}

fn default_pretty() -> bool {
    true
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            default_actor_name: default_actor_name(),
            pretty: default_pretty(),
        }
    }
}

impl BackupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_default_actor_name(mut self, name: impl Into<String>) -> Self {
        self.default_actor_name = name.into();
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
