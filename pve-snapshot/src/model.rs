//! Values passed into and out of a snapshot query.

use std::fmt;
use std::str::FromStr;

use pve_core::error::PveError;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One entry of an instance's snapshot list, as returned by
/// `GET /nodes/{node}/{type}/{vmid}/snapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub name: String,

    /// Creation time in seconds since the epoch. The `current` entry has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snaptime: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// 1 when the snapshot includes RAM state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmstate: Option<u8>,
}

impl SnapshotRecord {
    pub fn new(name: impl Into<String>, snaptime: i64) -> Self {
        Self {
            name: name.into(),
            snaptime: Some(snaptime),
            description: None,
            parent: None,
            vmstate: None,
        }
    }

    /// The live-state pseudo entry every instance reports.
    pub fn current() -> Self {
        Self {
            name: crate::filter::CURRENT_SNAPSHOT.to_string(),
            snaptime: None,
            description: Some("You are here!".to_string()),
            parent: None,
            vmstate: None,
        }
    }
}

/// Numeric Proxmox instance ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Vmid(pub u32);

impl fmt::Display for Vmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Vmid {
    fn from(id: u32) -> Self {
        Vmid(id)
    }
}

impl FromStr for Vmid {
    type Err = PveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        pve_core::validation::parse_vmid(s).map(Vmid)
    }
}

/// Wire shapes an instance ID shows up in.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVmid {
    Number(u32),
    Text(String),
}

impl<'de> Deserialize<'de> for Vmid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawVmid::deserialize(deserializer)? {
            RawVmid::Number(id) => Ok(Vmid(id)),
            RawVmid::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// `vmid` arrives as a string, an integer, an empty string or null.
/// The last two mean "not given".
fn deserialize_optional_vmid<'de, D>(deserializer: D) -> Result<Option<Vmid>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawVmid>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawVmid::Number(id)) => Ok(Some(Vmid(id))),
        Some(RawVmid::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawVmid::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Module parameters of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameters {
    /// Instance name, used only when `vmid` is absent.
    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_vmid")]
    pub vmid: Option<Vmid>,

    /// Keep only snapshots whose name starts with this prefix.
    #[serde(default)]
    pub snapname: Option<String>,

    /// Minimum age in whole days; the comparison is strict.
    #[serde(default, deserialize_with = "pve_core::de::number")]
    pub older_than: u32,

    /// Transport timeout in seconds. Not interpreted by the query itself.
    #[serde(default = "default_timeout", deserialize_with = "pve_core::de::number")]
    pub timeout: u64,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            hostname: None,
            vmid: None,
            snapname: None,
            older_than: 0,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl QueryParameters {
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref().filter(|h| !h.is_empty())
    }

    pub fn snapname(&self) -> Option<&str> {
        self.snapname.as_deref().filter(|p| !p.is_empty())
    }
}
