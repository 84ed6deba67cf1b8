//! Cache infrastructure - multi-level response cache

mod eviction;
mod multilevel;
mod semantic;
mod snapshot;
mod store;
mod writer;

pub use multilevel::MultiLevelCache;
pub use snapshot::{restore_snapshot, save_snapshot, CacheSnapshot, SnapshotEntry};
pub use writer::CacheWriter;
