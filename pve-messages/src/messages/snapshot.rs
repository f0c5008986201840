//! Snapshot query and cluster lookup messages

pub struct SnapshotMessages {
    // ============================================================================
    // Soft outcomes (reported with changed=false, never as failures)
    // ============================================================================
    pub snapshots_unavailable: &'static str,
    pub vmid_unresolved: &'static str,

    // ============================================================================
    // Cluster errors
    // ============================================================================
    pub auth_failed: &'static str,

    // ============================================================================
    // Construction errors
    // ============================================================================
    pub missing_source: &'static str,
}

pub const SNAPSHOT_MESSAGES: SnapshotMessages = SnapshotMessages {
    snapshots_unavailable: "Snapshots could not be fetched",
    vmid_unresolved: "Vmid could not be fetched",

    auth_failed: "Couldn't authenticate user: {user} to https://{host}:{port}/api2/json : {error}",

    missing_source: "Failed to import the required Proxmox snapshot client: no snapshot source was configured",
};
