use pve_core::error::Result;

use crate::model::{SnapshotRecord, Vmid};

/// Read-only view of a cluster's instances and their snapshots.
pub trait SnapshotSource {
    /// Look up the instance ID for a name. `Ok(None)` when no instance has it.
    fn resolve_vmid(&self, hostname: &str) -> Result<Option<Vmid>>;

    /// Raw snapshot list of an instance, in the order the cluster reports it.
    fn fetch_snapshots(&self, vmid: Vmid) -> Result<Vec<SnapshotRecord>>;
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for &T {
    fn resolve_vmid(&self, hostname: &str) -> Result<Option<Vmid>> {
        (**self).resolve_vmid(hostname)
    }

    fn fetch_snapshots(&self, vmid: Vmid) -> Result<Vec<SnapshotRecord>> {
        (**self).fetch_snapshots(vmid)
    }
}
