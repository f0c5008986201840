//! Proxmox VE connection settings.
//!
//! Settings are layered: config file, then `PROXMOX_*` environment
//! variables, then explicit module parameters. [`ProxmoxConfig::validate`]
//! turns the merged layers into [`ConnectionSettings`].

pub mod config;
pub mod loader;
pub mod settings;

pub use config::ProxmoxConfig;
pub use loader::ConfigLoader;
pub use settings::{ConnectionSettings, Credentials, DEFAULT_API_PORT};
