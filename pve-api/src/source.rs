use pve_core::error::{PveError, Result};
use pve_snapshot::{SnapshotRecord, SnapshotSource, Vmid};
use tracing::debug;

use crate::client::ProxmoxClient;

impl SnapshotSource for ProxmoxClient {
    /// An unknown name resolves to `None`; a name shared by several
    /// instances is an error because either choice could be wrong.
    fn resolve_vmid(&self, hostname: &str) -> Result<Option<Vmid>> {
        let vmids = self.vmids_by_name(hostname)?;
        debug!(hostname, matches = vmids.len(), "looked up instance name");

        match vmids.as_slice() {
            [] => Ok(None),
            [vmid] => Ok(Some(Vmid(*vmid))),
            _ => Err(PveError::AmbiguousName(hostname.to_string())),
        }
    }

    fn fetch_snapshots(&self, vmid: Vmid) -> Result<Vec<SnapshotRecord>> {
        let vm = self.get_vm(vmid.0)?;
        debug!(%vmid, node = %vm.node, kind = ?vm.kind, "listing snapshots");
        Ok(self.snapshots(&vm)?.unwrap_or_default())
    }
}
