//! Validated connection settings.

use pve_core::error::{PveError, Result};
use pve_core::validation::{validate_api_host, validate_api_user};
use pve_messages::{msg, MESSAGES};

use crate::config::ProxmoxConfig;

pub const DEFAULT_API_PORT: u16 = 8006;

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password(String),
    Token { id: String, secret: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Password(_) => f.write_str("Password(<redacted>)"),
            Credentials::Token { id, .. } => write!(f, "Token {{ id: {:?}, secret: <redacted> }}", id),
        }
    }
}

/// Everything needed to open an authenticated API session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credentials: Credentials,
    pub validate_certs: bool,
    /// Explicit API root; when unset the URL is built from host and port.
    pub api_url: Option<String>,
}

impl ConnectionSettings {
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.api_url {
            url.clone()
        } else if self.host.contains(':') && !self.host.starts_with('[') {
            format!("https://[{}]:{}/api2/json", self.host, self.port)
        } else {
            format!("https://{}:{}/api2/json", self.host, self.port)
        }
    }
}

/// `pve1:8007` carries its own port; bare IPv6 addresses do not.
fn split_host_port(raw: &str) -> Result<(String, Option<u16>)> {
    let raw = raw.trim();

    if let Some(rest) = raw.strip_prefix('[') {
        if let Some((addr, tail)) = rest.split_once(']') {
            let port = match tail.strip_prefix(':') {
                Some(port) => Some(parse_port(port)?),
                None if tail.is_empty() => None,
                None => {
                    return Err(PveError::Validation(format!("Invalid api_host '{}'", raw)));
                }
            };
            return Ok((addr.to_string(), port));
        }
    }

    match raw.split_once(':') {
        Some((host, port)) if !port.contains(':') => Ok((host.to_string(), Some(parse_port(port)?))),
        _ => Ok((raw.to_string(), None)),
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| PveError::Validation(format!("Invalid port '{}' in api_host", raw)))
}

impl ProxmoxConfig {
    /// Check required fields and their combinations.
    ///
    /// An API token is preferred over a password when both are present.
    pub fn validate(&self) -> Result<ConnectionSettings> {
        let mut missing = Vec::new();
        if self.api_host.as_deref().map_or(true, str::is_empty) {
            missing.push("api_host");
        }
        if self.api_user.as_deref().map_or(true, str::is_empty) {
            missing.push("api_user");
        }
        if !missing.is_empty() {
            return Err(PveError::Validation(msg!(
                MESSAGES.config.missing_required,
                fields = missing.join(", ")
            )));
        }

        let raw_host = self.api_host.as_deref().unwrap_or_default();
        let user = self.api_user.clone().unwrap_or_default();

        let (host, embedded_port) = split_host_port(raw_host)?;
        validate_api_host(&host)?;
        validate_api_user(&user)?;

        let credentials = match (
            self.api_token_id.as_deref(),
            self.api_token_secret.as_deref(),
            self.api_password.as_deref(),
        ) {
            (Some(id), Some(secret), _) => Credentials::Token {
                id: id.to_string(),
                secret: secret.to_string(),
            },
            (Some(_), None, _) | (None, Some(_), _) => {
                return Err(PveError::Validation(
                    MESSAGES.config.token_pair_incomplete.to_string(),
                ));
            }
            (None, None, Some(password)) => Credentials::Password(password.to_string()),
            (None, None, None) => {
                return Err(PveError::Validation(
                    MESSAGES.config.password_or_token_required.to_string(),
                ));
            }
        };

        Ok(ConnectionSettings {
            host,
            port: self
                .api_port
                .or(embedded_port)
                .unwrap_or(DEFAULT_API_PORT),
            user,
            credentials,
            validate_certs: self.validate_certs.unwrap_or(false),
            api_url: self
                .api_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(|url| url.trim_end_matches('/').to_string()),
        })
    }
}
