//! One module invocation: merge parameters, connect, query, report.

use std::time::Duration;

use chrono::{DateTime, Utc};
use pve_api::ProxmoxClient;
use pve_config::{ConfigLoader, ConnectionSettings, ProxmoxConfig};
use pve_core::error::{PveError, Result};
use pve_snapshot::{ModuleReport, QueryParameters, SnapshotQuery, Vmid};
use serde::Serialize;
use tracing::{debug, info};

use crate::args_file::ModuleArgs;
use crate::cli::{Args, ConnectionArgs};

/// Printed instead of a [`ModuleReport`] when the invocation fails.
#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub failed: bool,
    pub changed: bool,
    pub msg: String,
    pub exception: String,
}

impl From<&PveError> for FailureReport {
    fn from(err: &PveError) -> Self {
        FailureReport {
            failed: true,
            changed: false,
            msg: err.to_string(),
            exception: format!("{:?}", err),
        }
    }
}

/// Fully resolved inputs of one run.
#[derive(Debug)]
pub struct Invocation {
    pub params: QueryParameters,
    pub settings: ConnectionSettings,
}

impl Invocation {
    /// Layer the inputs: config file < environment < args file < flags.
    pub fn from_args(args: &Args, loader: &ConfigLoader, env: ProxmoxConfig) -> Result<Self> {
        let file_args = match &args.args_file {
            Some(path) => ModuleArgs::load(path)?,
            None => ModuleArgs::default(),
        };

        let params = merge_parameters(file_args.query, args)?;

        let settings = loader
            .load(args.config.as_deref())?
            .merge(env)
            .merge(file_args.connection)
            .merge(connection_layer(&args.connection))
            .validate()?;

        Ok(Self { params, settings })
    }

    pub fn execute(&self, now: DateTime<Utc>) -> Result<ModuleReport> {
        let client = ProxmoxClient::connect(&self.settings, self.timeout())?;
        self.query(client, now)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.params.timeout)
    }

    fn query(&self, client: ProxmoxClient, now: DateTime<Utc>) -> Result<ModuleReport> {
        let query = SnapshotQuery::builder().source(client).build()?;
        let outcome = query.run(&self.params, now)?;
        info!(outcome = ?outcome, "snapshot query finished");
        Ok(outcome.into())
    }
}

fn merge_parameters(mut params: QueryParameters, args: &Args) -> Result<QueryParameters> {
    if let Some(hostname) = &args.hostname {
        params.hostname = Some(hostname.clone());
    }
    if let Some(raw) = &args.vmid {
        params.vmid = if raw.trim().is_empty() {
            None
        } else {
            Some(raw.parse::<Vmid>()?)
        };
    }
    if let Some(snapname) = &args.snapname {
        params.snapname = Some(snapname.clone());
    }
    if let Some(older_than) = args.older_than {
        params.older_than = older_than;
    }
    if let Some(timeout) = args.timeout {
        params.timeout = timeout;
    }

    debug!(
        hostname = ?params.hostname(),
        vmid = ?params.vmid,
        snapname = ?params.snapname(),
        older_than = params.older_than,
        timeout = params.timeout,
        "module parameters"
    );
    Ok(params)
}

fn connection_layer(args: &ConnectionArgs) -> ProxmoxConfig {
    ProxmoxConfig {
        api_host: args.api_host.clone(),
        api_port: args.api_port,
        api_user: args.api_user.clone(),
        api_password: args.api_password.clone(),
        api_token_id: args.api_token_id.clone(),
        api_token_secret: args.api_token_secret.clone(),
        validate_certs: args.validate_certs,
        api_url: args.api_url.clone(),
        extra: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::Parser;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = 86_400;

    fn api_root(server: &mockito::ServerGuard) -> String {
        format!("{}/api2/json", server.url())
    }

    fn isolated_loader(temp: &TempDir) -> ConfigLoader {
        ConfigLoader::with_dirs(temp.path(), None)
    }

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "pve-snap-info",
            "--api-host",
            "127.0.0.1",
            "--api-user",
            "root@pam",
            "--api-token-id",
            "ci",
            "--api-token-secret",
            "0000-1111",
        ];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_flags_override_args_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("args.json");
        fs::write(
            &file,
            json!({"vmid": "100", "older_than": 5, "api_host": "from-file", "timeout": 10}).to_string(),
        )
        .unwrap();

        let mut args = parse(&["--older-than", "1"]);
        args.args_file = Some(file);

        let invocation =
            Invocation::from_args(&args, &isolated_loader(&temp), ProxmoxConfig::default()).unwrap();
        assert_eq!(invocation.params.vmid, Some(Vmid(100)));
        assert_eq!(invocation.params.older_than, 1);
        assert_eq!(invocation.params.timeout, 10);
        assert_eq!(invocation.settings.host, "127.0.0.1");
    }

    #[test]
    fn test_environment_fills_missing_settings() {
        let temp = TempDir::new().unwrap();
        let args = Args::parse_from(["pve-snap-info", "--hostname", "web01"]);
        let env = ProxmoxConfig {
            api_host: Some("pve-env".to_string()),
            api_user: Some("root@pam".to_string()),
            api_password: Some("secret".to_string()),
            ..Default::default()
        };

        let invocation = Invocation::from_args(&args, &isolated_loader(&temp), env).unwrap();
        assert_eq!(invocation.settings.host, "pve-env");
        assert_eq!(invocation.params.hostname(), Some("web01"));
        assert_eq!(invocation.params.timeout, 30);
    }

    #[test]
    fn test_invalid_vmid_flag() {
        let temp = TempDir::new().unwrap();
        let args = parse(&["--vmid", "web01"]);
        let err = Invocation::from_args(&args, &isolated_loader(&temp), ProxmoxConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "vmid 'web01' is not a valid instance ID");
    }

    #[test]
    fn test_missing_connection_settings() {
        let temp = TempDir::new().unwrap();
        let args = Args::parse_from(["pve-snap-info", "--vmid", "100"]);
        let err = Invocation::from_args(&args, &isolated_loader(&temp), ProxmoxConfig::default())
            .unwrap_err();
        assert!(matches!(err, PveError::Validation(_)));
    }

    #[test]
    fn test_execute_against_api() {
        let mut server = Server::new();
        let _version = server
            .mock("GET", "/api2/json/version")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": {"version": "8.2.4"}}).to_string())
            .create();
        let _resources = server
            .mock("GET", "/api2/json/cluster/resources")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"data": [{"vmid": 100, "name": "web01", "node": "pve1", "type": "qemu"}]})
                    .to_string(),
            )
            .create();
        let _snapshots = server
            .mock("GET", "/api2/json/nodes/pve1/qemu/100/snapshot")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"data": [
                    {"name": "current"},
                    {"name": "daily_1", "snaptime": NOW - 3 * DAY},
                    {"name": "daily_2", "snaptime": NOW - DAY}
                ]})
                .to_string(),
            )
            .create();

        let temp = TempDir::new().unwrap();
        let api_url = api_root(&server);
        let args = parse(&["--vmid", "100", "--snapname", "daily_", "--api-url", api_url.as_str()]);
        let invocation =
            Invocation::from_args(&args, &isolated_loader(&temp), ProxmoxConfig::default()).unwrap();
        let now = Utc.timestamp_opt(NOW, 0).unwrap();
        let report = invocation.execute(now).unwrap();

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"changed": false, "results": ["daily_1", "daily_2"]})
        );
    }

    #[test]
    fn test_execute_with_empty_snapshot_list() {
        let mut server = Server::new();
        let _version = server
            .mock("GET", "/api2/json/version")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": {"version": "8.2.4"}}).to_string())
            .create();
        let _resources = server
            .mock("GET", "/api2/json/cluster/resources")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"data": [{"vmid": 200, "name": "dns", "node": "pve2", "type": "lxc"}]})
                    .to_string(),
            )
            .create();
        let _snapshots = server
            .mock("GET", "/api2/json/nodes/pve2/lxc/200/snapshot")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": []}).to_string())
            .create();

        let temp = TempDir::new().unwrap();
        let api_url = api_root(&server);
        let invocation = Invocation::from_args(
            &parse(&["--hostname", "dns", "--api-url", api_url.as_str()]),
            &isolated_loader(&temp),
            ProxmoxConfig::default(),
        )
        .unwrap();
        let report = invocation.execute(Utc::now()).unwrap();

        assert!(!report.changed);
        assert_eq!(report.results, None);
        assert_eq!(report.msg.as_deref(), Some("Snapshots could not be fetched"));
    }

    #[test]
    fn test_failure_report_shape() {
        let report = FailureReport::from(&PveError::VmNotFound(100));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "failed": true,
                "changed": false,
                "msg": "VM with vmid 100 does not exist in cluster",
                "exception": "VmNotFound(100)"
            })
        );
    }
}
