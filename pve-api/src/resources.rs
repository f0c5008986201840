use serde::Deserialize;

/// Instance flavour; it selects the `/nodes/{node}/{type}` subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmKind {
    Qemu,
    Lxc,
    #[serde(other)]
    Other,
}

impl VmKind {
    pub fn as_path(&self) -> Option<&'static str> {
        match self {
            VmKind::Qemu => Some("qemu"),
            VmKind::Lxc => Some("lxc"),
            VmKind::Other => None,
        }
    }
}

/// One entry of `GET /cluster/resources?type=vm`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterResource {
    pub vmid: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub node: String,
    #[serde(rename = "type")]
    pub kind: VmKind,
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /version`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default)]
    pub repoid: Option<String>,
}

/// Every API response wraps its payload in `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
}

/// `POST /access/ticket`. The CSRF token is only needed for writes.
#[derive(Debug, Deserialize)]
pub(crate) struct Ticket {
    pub ticket: String,
}
