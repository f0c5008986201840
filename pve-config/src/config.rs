use indexmap::IndexMap;
use pve_core::de;
use pve_core::error::{PveError, Result};
use serde::{Deserialize, Serialize};

pub use pve_core::de::parse_bool;

/// One layer of connection settings. Every field is optional so layers can
/// be merged before validation.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxmoxConfig {
    /// Cluster node to talk to, optionally as `host:port`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    #[serde(
        default,
        deserialize_with = "de::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_port: Option<u16>,

    /// User including realm, e.g. `root@pam`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_secret: Option<String>,

    #[serde(
        default,
        deserialize_with = "de::optional_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub validate_certs: Option<bool>,

    /// Full API root such as `https://pve.lan/proxmox/api2/json`, for nodes
    /// behind a reverse proxy. Replaces the URL built from host and port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Keys this tool does not know about; kept so shared files still load.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

// Hand-written so secrets never end up in logs
impl std::fmt::Debug for ProxmoxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "<redacted>"
            } else {
                "<unset>"
            }
        }

        f.debug_struct("ProxmoxConfig")
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("api_user", &self.api_user)
            .field("api_password", &redact(&self.api_password))
            .field("api_token_id", &self.api_token_id)
            .field("api_token_secret", &redact(&self.api_token_secret))
            .field("validate_certs", &self.validate_certs)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ProxmoxConfig {
    /// Overlay `higher` on top of `self`; set fields in `higher` win.
    pub fn merge(self, higher: ProxmoxConfig) -> ProxmoxConfig {
        let mut extra = self.extra;
        extra.extend(higher.extra);

        ProxmoxConfig {
            api_host: higher.api_host.or(self.api_host),
            api_port: higher.api_port.or(self.api_port),
            api_user: higher.api_user.or(self.api_user),
            api_password: higher.api_password.or(self.api_password),
            api_token_id: higher.api_token_id.or(self.api_token_id),
            api_token_secret: higher.api_token_secret.or(self.api_token_secret),
            validate_certs: higher.validate_certs.or(self.validate_certs),
            api_url: higher.api_url.or(self.api_url),
            extra,
        }
    }

    /// Read the `PROXMOX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ProxmoxConfig::from_env`] with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let api_port = get("PROXMOX_PORT")
            .map(|raw| {
                raw.trim().parse::<u16>().map_err(|_| {
                    PveError::Config(format!("PROXMOX_PORT '{}' is not a valid port", raw))
                })
            })
            .transpose()?;

        let validate_certs = get("PROXMOX_VALIDATE_CERTS")
            .map(|raw| {
                parse_bool(&raw).ok_or_else(|| {
                    PveError::Config(format!(
                        "PROXMOX_VALIDATE_CERTS '{}' is not a valid boolean",
                        raw
                    ))
                })
            })
            .transpose()?;

        Ok(ProxmoxConfig {
            api_host: get("PROXMOX_HOST"),
            api_port,
            api_user: get("PROXMOX_USER"),
            api_password: get("PROXMOX_PASSWORD"),
            api_token_id: get("PROXMOX_TOKEN_ID"),
            api_token_secret: get("PROXMOX_TOKEN_SECRET"),
            validate_certs,
            api_url: get("PROXMOX_API_URL"),
            extra: IndexMap::new(),
        })
    }
}
