pub mod audit;
pub mod snapshot;
pub mod table;
pub mod value;

pub use audit::{ActionKind, AuditRecord};
pub use snapshot::{ActorId, Snapshot, SnapshotBody};
pub use table::TableName;
pub use value::{Row, Value};
