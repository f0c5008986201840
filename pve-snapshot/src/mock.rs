//! In-memory [`SnapshotSource`] for tests.

use std::cell::Cell;
use std::collections::HashMap;

use pve_core::error::{PveError, Result};

use crate::model::{SnapshotRecord, Vmid};
use crate::source::SnapshotSource;

#[derive(Debug, Default)]
pub struct MockSource {
    names: Vec<(String, Vmid)>,
    snapshots: HashMap<Vmid, Vec<SnapshotRecord>>,
    resolve_calls: Cell<usize>,
    fetch_calls: Cell<usize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vm(mut self, name: &str, vmid: u32, snapshots: Vec<SnapshotRecord>) -> Self {
        self.names.push((name.to_string(), Vmid(vmid)));
        self.snapshots.insert(Vmid(vmid), snapshots);
        self
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.get()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.get()
    }
}

impl SnapshotSource for MockSource {
    fn resolve_vmid(&self, hostname: &str) -> Result<Option<Vmid>> {
        self.resolve_calls.set(self.resolve_calls.get() + 1);
        let matches: Vec<Vmid> = self
            .names
            .iter()
            .filter(|(name, _)| name == hostname)
            .map(|(_, vmid)| *vmid)
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [vmid] => Ok(Some(*vmid)),
            _ => Err(PveError::AmbiguousName(hostname.to_string())),
        }
    }

    fn fetch_snapshots(&self, vmid: Vmid) -> Result<Vec<SnapshotRecord>> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        self.snapshots
            .get(&vmid)
            .cloned()
            .ok_or(PveError::VmNotFound(vmid.0))
    }
}
