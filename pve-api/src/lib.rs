//! Proxmox VE API client.
//!
//! Covers the small read-only slice of `/api2/json` the snapshot query
//! needs: authentication, the version probe, the cluster resource list and
//! per-instance snapshot lists.

pub mod client;
pub mod resources;
mod source;

#[cfg(test)]
mod test_support;

pub use client::ProxmoxClient;
pub use resources::{ClusterResource, VersionInfo, VmKind};
