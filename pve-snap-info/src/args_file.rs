//! Module parameters handed over as a JSON file.
//!
//! Automation tooling runs binary modules as `module <path>`, where the file
//! holds the task's parameters, either bare or wrapped in
//! `ANSIBLE_MODULE_ARGS`, mixed with internal `_ansible_*` keys.

use std::fs;
use std::path::Path;

use anyhow::Context;
use pve_config::ProxmoxConfig;
use pve_core::error::{PveError, Result};
use pve_snapshot::QueryParameters;
use serde::Deserialize;
use serde_json::{Map, Value};

const WRAPPER_KEY: &str = "ANSIBLE_MODULE_ARGS";
const INTERNAL_PREFIX: &str = "_ansible_";

#[derive(Debug, Default, Deserialize)]
pub struct ModuleArgs {
    #[serde(flatten)]
    pub query: QueryParameters,

    #[serde(flatten)]
    pub connection: ProxmoxConfig,
}

impl ModuleArgs {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read module arguments from {}", path.display()))
            .map_err(|e| PveError::Config(format!("{:#}", e)))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(mut map) = value else {
            return Err(PveError::Validation(
                "module arguments must be a JSON object".to_string(),
            ));
        };

        if let Some(Value::Object(inner)) = map.remove(WRAPPER_KEY) {
            map = inner;
        }

        let params: Map<String, Value> = map
            .into_iter()
            .filter(|(key, value)| !key.starts_with(INTERNAL_PREFIX) && !value.is_null())
            .collect();

        let mut args: ModuleArgs = serde_json::from_value(Value::Object(params))?;
        // Keep module parameters out of the connection layer's catch-all
        args.connection
            .extra
            .retain(|key, _| !QUERY_KEYS.contains(&key.as_str()));
        Ok(args)
    }
}

const QUERY_KEYS: &[&str] = &["hostname", "vmid", "snapname", "older_than", "timeout"];
