//! Snapshot inventory query.
//!
//! Resolves an instance, fetches its snapshots through a [`SnapshotSource`]
//! and keeps the names that pass the prefix and age filters.

pub mod filter;
pub mod model;
pub mod query;
pub mod report;
pub mod source;

#[cfg(test)]
mod mock;

pub use filter::{filter_snapshots, is_older_than, CURRENT_SNAPSHOT};
pub use model::{QueryParameters, SnapshotRecord, Vmid, DEFAULT_TIMEOUT_SECS};
pub use query::{EmptyReason, QueryOutcome, SnapshotQuery, SnapshotQueryBuilder};
pub use report::ModuleReport;
pub use source::SnapshotSource;
