// Standard library imports
use std::fs;
use std::path::{Path, PathBuf};

// External crate imports
use anyhow::{bail, Context};
use pve_core::error::{PveError, Result};
use pve_messages::{msg, MESSAGES};
use tracing::debug;

// Internal imports
use crate::config::ProxmoxConfig;

pub const LOCAL_CONFIG_FILE: &str = "proxmox.yaml";
const GLOBAL_CONFIG_DIR: &str = "pve-snap-info";
const GLOBAL_CONFIG_FILE: &str = "config.yaml";

/// Finds and loads the connection settings file.
///
/// Discovery order:
/// 1. **Explicit path:** `--config`, which must exist.
/// 2. **Current and parent directories:** the nearest `proxmox.yaml`.
/// 3. **User config:** `<config dir>/pve-snap-info/config.yaml`.
///
/// No file at all is not an error; the other layers may carry everything.
pub struct ConfigLoader {
    start_dir: Option<PathBuf>,
    user_config_dir: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            start_dir: std::env::current_dir().ok(),
            user_config_dir: dirs::config_dir(),
        }
    }

    /// Loader rooted at fixed directories instead of the process environment.
    pub fn with_dirs(start_dir: impl Into<PathBuf>, user_config_dir: Option<PathBuf>) -> Self {
        Self {
            start_dir: Some(start_dir.into()),
            user_config_dir,
        }
    }

    /// Load the file layer. Returns an empty layer when no file is found.
    pub fn load(&self, explicit: Option<&Path>) -> Result<ProxmoxConfig> {
        match self.locate(explicit) {
            Ok(Some(path)) => {
                debug!("Loading connection settings from: {}", path.display());
                Self::load_file(&path).map_err(|e| {
                    PveError::Config(format!(
                        "{}: {:#}",
                        msg!(
                            MESSAGES.config.file_read_failed,
                            path = path.display().to_string()
                        ),
                        e
                    ))
                })
            }
            Ok(None) => {
                debug!("No connection settings file found");
                Ok(ProxmoxConfig::default())
            }
            Err(e) => Err(PveError::Config(format!("{:#}", e))),
        }
    }

    fn locate(&self, explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
            if !expanded.is_file() {
                bail!("Config file {} does not exist", expanded.display());
            }
            return Ok(Some(expanded));
        }

        if let Some(start) = &self.start_dir {
            if let Some(found) = Self::find_in_parent_dirs(start, LOCAL_CONFIG_FILE) {
                return Ok(Some(found));
            }
        }

        if let Some(dir) = &self.user_config_dir {
            let global = dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE);
            if global.is_file() {
                return Ok(Some(global));
            }
        }

        Ok(None)
    }

    /// Walks up from `start` looking for `filename`.
    fn find_in_parent_dirs(start: &Path, filename: &str) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(filename))
            .find(|candidate| candidate.is_file())
    }

    fn load_file(path: &Path) -> anyhow::Result<ProxmoxConfig> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file at {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(ProxmoxConfig::default());
        }

        serde_yaml_ng::from_str(&contents)
            .with_context(|| format!("Invalid YAML in {}", path.display()))
    }
}
