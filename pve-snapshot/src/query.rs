//! The snapshot inventory query.

use chrono::{DateTime, Utc};
use pve_core::error::{PveError, Result};
use pve_messages::MESSAGES;
use tracing::{debug, info};

use crate::filter::filter_snapshots;
use crate::model::QueryParameters;
use crate::source::SnapshotSource;

/// Why a query ended without listing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// No vmid given and the hostname was absent or unknown to the cluster.
    UnresolvedIdentifier,
    /// The instance reported an empty snapshot list.
    NoSnapshots,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::UnresolvedIdentifier => MESSAGES.snapshot.vmid_unresolved,
            EmptyReason::NoSnapshots => MESSAGES.snapshot.snapshots_unavailable,
        }
    }
}

/// Result of a query. Neither variant is a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Listed(Vec<String>),
    Empty(EmptyReason),
}

/// Lists the snapshots of one instance that pass the name and age filters.
pub struct SnapshotQuery<'a> {
    source: Box<dyn SnapshotSource + 'a>,
}

#[derive(Default)]
pub struct SnapshotQueryBuilder<'a> {
    source: Option<Box<dyn SnapshotSource + 'a>>,
}

impl<'a> SnapshotQueryBuilder<'a> {
    pub fn source(mut self, source: impl SnapshotSource + 'a) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Fails with [`PveError::MissingDependency`] when no source was given.
    pub fn build(self) -> Result<SnapshotQuery<'a>> {
        let source = self
            .source
            .ok_or_else(|| PveError::MissingDependency(MESSAGES.snapshot.missing_source.to_string()))?;
        Ok(SnapshotQuery { source })
    }
}

impl<'a> SnapshotQuery<'a> {
    pub fn builder() -> SnapshotQueryBuilder<'a> {
        SnapshotQueryBuilder::default()
    }

    pub fn new(source: impl SnapshotSource + 'a) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Run the query with `now` as the reference time for the age filter.
    ///
    /// Errors from the source are returned unchanged.
    pub fn run(&self, params: &QueryParameters, now: DateTime<Utc>) -> Result<QueryOutcome> {
        let vmid = match (params.vmid, params.hostname()) {
            (Some(vmid), _) => vmid,
            (None, Some(hostname)) => match self.source.resolve_vmid(hostname)? {
                Some(vmid) => {
                    debug!(hostname, %vmid, "resolved instance name");
                    vmid
                }
                None => {
                    info!(hostname, "instance name did not resolve");
                    return Ok(QueryOutcome::Empty(EmptyReason::UnresolvedIdentifier));
                }
            },
            (None, None) => return Ok(QueryOutcome::Empty(EmptyReason::UnresolvedIdentifier)),
        };

        let records = self.source.fetch_snapshots(vmid)?;
        if records.is_empty() {
            info!(%vmid, "instance reported no snapshots");
            return Ok(QueryOutcome::Empty(EmptyReason::NoSnapshots));
        }

        let names = filter_snapshots(&records, params.snapname(), params.older_than, now);
        debug!(
            %vmid,
            total = records.len(),
            kept = names.len(),
            "filtered snapshot list"
        );

        Ok(QueryOutcome::Listed(names))
    }
}
