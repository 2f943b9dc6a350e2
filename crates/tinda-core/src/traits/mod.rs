pub mod audit;
pub mod store;

pub use audit::AuditLog;
pub use store::{DomainStore, StoreReader, StoreTxn};
