// CLI argument parsing and definitions

use clap::{Args as ClapArgs, Parser};
use pve_core::error::PveError;
use std::path::PathBuf;

#[derive(Clone, Parser)]
#[command(name = "pve-snap-info")]
#[command(about = "List snapshots of a Proxmox VE instance, filtered by name prefix and age")]
#[command(version)]
pub struct Args {
    /// JSON file with module parameters, as handed to binary modules by automation tooling
    pub args_file: Option<PathBuf>,

    /// Instance name, used when --vmid is not given
    #[arg(long)]
    pub hostname: Option<String>,

    /// Instance ID
    #[arg(long)]
    pub vmid: Option<String>,

    /// Timeout for API requests, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Only list snapshots whose name begins with this prefix
    #[arg(long)]
    pub snapname: Option<String>,

    /// Only list snapshots strictly older than this many days
    #[arg(long)]
    pub older_than: Option<u32>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Path to a connection settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Clone, Default, ClapArgs)]
pub struct ConnectionArgs {
    /// Proxmox VE node to connect to, optionally as host:port
    #[arg(long)]
    pub api_host: Option<String>,

    /// API port (default 8006)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// API user including realm, e.g. root@pam
    #[arg(long)]
    pub api_user: Option<String>,

    /// Password of the API user
    #[arg(long)]
    pub api_password: Option<String>,

    /// API token ID (the part after '!')
    #[arg(long)]
    pub api_token_id: Option<String>,

    /// API token secret
    #[arg(long)]
    pub api_token_secret: Option<String>,

    /// Verify the node's TLS certificate
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub validate_certs: Option<bool>,

    /// Full API root, e.g. https://pve.lan/proxmox/api2/json; replaces host and port
    #[arg(long)]
    pub api_url: Option<String>,
}

/// Turn a rejected command line into the error reported on stdout.
pub fn usage_error(err: &clap::Error) -> PveError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or_default();
    let message = first_line.strip_prefix("error: ").unwrap_or(first_line).trim();
    PveError::Validation(message.to_string())
}
