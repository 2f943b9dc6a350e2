pub mod backup;
pub mod store;

pub use backup::BackupConfig;
pub use store::{StoreConfig, SynchronousMode};
