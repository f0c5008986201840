//! Validation of connection settings and module parameters.
//!
//! Everything here runs before the first request leaves the machine.

use std::net::{IpAddr, Ipv6Addr};

use pve_messages::{msg, MESSAGES};

use crate::error::{PveError, Result};

/// Validate the Proxmox API host (hostname or IP address, no port).
pub fn validate_api_host(host: &str) -> Result<()> {
    if host.is_empty() || host.len() > 253 {
        return Err(PveError::Validation(
            "api_host must be between 1 and 253 characters".to_string(),
        ));
    }

    if host.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(PveError::Validation(
            "api_host contains whitespace or control characters".to_string(),
        ));
    }

    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let ipv6_candidate = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if ipv6_candidate.parse::<Ipv6Addr>().is_ok() {
        return Ok(());
    }

    // All-numeric dotted labels that failed to parse are a broken IPv4 address
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2
        && labels
            .iter()
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(PveError::Validation(format!(
            "Invalid IP address format: {}",
            host
        )));
    }

    validate_hostname(host)
}

/// Validate a hostname according to RFC 1123 rules
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.starts_with('.') || hostname.ends_with('.') {
        return Err(PveError::Validation(
            "Hostname cannot start or end with a dot".to_string(),
        ));
    }

    for label in hostname.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(PveError::Validation(
                "Hostname labels must be between 1 and 63 characters".to_string(),
            ));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(PveError::Validation(
                "Hostname labels cannot start or end with a hyphen".to_string(),
            ));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(PveError::Validation(format!(
                "Hostname label '{}' contains invalid characters (only alphanumeric and '-' allowed)",
                label
            )));
        }
    }

    Ok(())
}

/// Proxmox users always carry their authentication realm, e.g. `root@pam`.
pub fn validate_api_user(user: &str) -> Result<()> {
    let valid = match user.split_once('@') {
        Some((name, realm)) => !name.is_empty() && !realm.is_empty() && !realm.contains('@'),
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(PveError::Validation(msg!(
            MESSAGES.config.invalid_user,
            user = user
        )))
    }
}

/// Parse an instance ID given as free text.
pub fn parse_vmid(value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| PveError::Validation(msg!(MESSAGES.config.invalid_vmid, value = value)))
}
