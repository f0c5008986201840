//! Authenticated, blocking access to `/api2/json`.

use std::time::Duration;

use pve_config::{ConnectionSettings, Credentials};
use pve_core::error::{PveError, Result};
use pve_messages::{msg, MESSAGES};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, COOKIE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::resources::{ClusterResource, Envelope, Ticket, VersionInfo};

enum Session {
    /// Full `Authorization` header value.
    ApiToken(String),
    /// `PVEAuthCookie` value from a password login.
    Ticket(String),
}

impl Session {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Session::ApiToken(header) => request.header(AUTHORIZATION, header),
            Session::Ticket(ticket) => request.header(COOKIE, format!("PVEAuthCookie={ticket}")),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Session::ApiToken(_) => "api_token",
            Session::Ticket(_) => "ticket",
        }
    }
}

pub struct ProxmoxClient {
    http: Client,
    base_url: Url,
    session: Session,
}

impl std::fmt::Debug for ProxmoxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxmoxClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session.kind())
            .finish()
    }
}

impl ProxmoxClient {
    /// Log in to the API root (`https://{host}:{port}/api2/json` unless
    /// `api_url` is set) and probe `/version`.
    ///
    /// A zero `timeout` disables the request timeout.
    pub fn connect(settings: &ConnectionSettings, timeout: Duration) -> Result<Self> {
        let raw_url = settings.base_url();
        let base_url = Url::parse(&raw_url)
            .map_err(|e| PveError::Config(format!("Invalid API URL '{}': {}", raw_url, e)))?;

        let mut builder = Client::builder().danger_accept_invalid_certs(!settings.validate_certs);
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(transport_error)?;

        let authenticated = Self::establish(http, base_url, settings);
        authenticated.map_err(|e| match e {
            PveError::Config(_) => e,
            other => PveError::Authentication(msg!(
                MESSAGES.snapshot.auth_failed,
                user = settings.user.as_str(),
                host = settings.host.as_str(),
                port = settings.port.to_string(),
                error = other.to_string()
            )),
        })
    }

    fn establish(http: Client, base_url: Url, settings: &ConnectionSettings) -> Result<Self> {
        let session = match &settings.credentials {
            Credentials::Token { id, secret } => {
                Session::ApiToken(format!("PVEAPIToken={}!{}={}", settings.user, id, secret))
            }
            Credentials::Password(password) => {
                let url = endpoint(&base_url, &["access", "ticket"])?;
                debug!(user = %settings.user, "requesting authentication ticket");
                let response = http
                    .post(url)
                    .form(&[("username", settings.user.as_str()), ("password", password.as_str())])
                    .send()
                    .map_err(transport_error)?;
                let ticket: Ticket = read_data(response)?.ok_or_else(|| {
                    PveError::Authentication("login response carried no ticket".to_string())
                })?;
                Session::Ticket(ticket.ticket)
            }
        };

        let client = Self {
            http,
            base_url,
            session,
        };
        let version = client.version()?;
        info!(
            version = %version.version,
            session = client.session.kind(),
            "connected to Proxmox VE"
        );

        Ok(client)
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Option<T>> {
        let url = endpoint(&self.base_url, segments)?;
        debug!(path = url.path(), "GET");

        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.session.apply(request).send().map_err(transport_error)?;
        read_data(response)
    }

    pub fn version(&self) -> Result<VersionInfo> {
        self.get(&["version"], &[])?
            .ok_or_else(|| PveError::Serialization("empty /version response".to_string()))
    }

    /// All virtual machines and containers of the cluster.
    pub fn cluster_vms(&self) -> Result<Vec<ClusterResource>> {
        Ok(self
            .get(&["cluster", "resources"], &[("type", "vm")])?
            .unwrap_or_default())
    }

    /// The cluster entry for `vmid`.
    pub fn get_vm(&self, vmid: u32) -> Result<ClusterResource> {
        self.cluster_vms()?
            .into_iter()
            .find(|vm| vm.vmid == vmid)
            .ok_or(PveError::VmNotFound(vmid))
    }

    /// IDs of every instance called `name`.
    pub fn vmids_by_name(&self, name: &str) -> Result<Vec<u32>> {
        Ok(self
            .cluster_vms()?
            .into_iter()
            .filter(|vm| vm.name.as_deref() == Some(name))
            .map(|vm| vm.vmid)
            .collect())
    }

    /// Raw snapshot list of an instance; `None` when the API returned no data.
    pub fn snapshots<T: DeserializeOwned>(&self, vm: &ClusterResource) -> Result<Option<Vec<T>>> {
        let kind = vm.kind.as_path().ok_or_else(|| {
            PveError::Validation(format!("Instance {} has an unsupported type", vm.vmid))
        })?;
        let vmid = vm.vmid.to_string();
        self.get(&["nodes", vm.node.as_str(), kind, vmid.as_str(), "snapshot"], &[])
    }
}

fn endpoint(base_url: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| PveError::Config(format!("API URL '{}' cannot carry a path", base_url)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn read_data<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(PveError::Authentication(
            "authentication failure (401)".to_string(),
        ));
    }

    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(PveError::Api {
            status: status.as_u16(),
            message: api_error_message(status, &body),
        });
    }

    let envelope: Envelope<T> = response.json().map_err(transport_error)?;
    Ok(envelope.data)
}

/// Parameter errors come back as `{"errors": {"field": "reason"}}`.
fn api_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(serde_json::Value::Object(errors)) = map.get("errors") {
            let details: Vec<String> = errors
                .iter()
                .map(|(field, reason)| match reason.as_str() {
                    Some(reason) => format!("{field}: {}", reason.trim()),
                    None => format!("{field}: {reason}"),
                })
                .collect();
            if !details.is_empty() {
                return details.join(", ");
            }
        }
    }

    let body = body.trim();
    if body.is_empty() || body.starts_with('{') {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

fn transport_error(err: reqwest::Error) -> PveError {
    if err.is_decode() {
        PveError::Serialization(err.to_string())
    } else if err.is_timeout() {
        PveError::Network(format!("request timed out: {err}"))
    } else {
        PveError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        mock_version, password_settings, token_settings, token_settings_at, TIMEOUT,
    };
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_token_session_sends_api_token_header() {
        let mut server = Server::new();
        let version = server
            .mock("GET", "/api2/json/version")
            .match_header("authorization", "PVEAPIToken=root@pam!ci=0000-1111")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": {"version": "8.2.4", "release": "8.2"}}).to_string())
            .create();

        let client = ProxmoxClient::connect(&token_settings(&server), TIMEOUT).unwrap();
        version.assert();
        assert!(format!("{:?}", client).contains("api_token"));
    }

    #[test]
    fn test_password_session_logs_in_and_uses_cookie() {
        let mut server = Server::new();
        let login = server
            .mock("POST", "/api2/json/access/ticket")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("username=root%40pam".into()),
                Matcher::Regex("password=hunter2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"data": {"ticket": "PVE:root@pam:TICKET", "CSRFPreventionToken": "csrf", "username": "root@pam"}})
                    .to_string(),
            )
            .create();
        let version = server
            .mock("GET", "/api2/json/version")
            .match_header("cookie", "PVEAuthCookie=PVE:root@pam:TICKET")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": {"version": "8.2.4"}}).to_string())
            .create();

        let client = ProxmoxClient::connect(&password_settings(&server), TIMEOUT).unwrap();
        login.assert();
        version.assert();
        assert!(format!("{:?}", client).contains("ticket"));
        assert!(!format!("{:?}", client).contains("TICKET"));
    }

    #[test]
    fn test_rejected_login_is_authentication_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/api2/json/access/ticket")
            .with_status(401)
            .create();

        let err = ProxmoxClient::connect(&password_settings(&server), TIMEOUT).unwrap_err();
        assert!(matches!(err, PveError::Authentication(_)));
        assert!(err.to_string().starts_with("Couldn't authenticate user: root@pam"));
    }

    #[test]
    fn test_failed_version_probe_is_authentication_error() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/api2/json/version")
            .with_status(401)
            .create();

        let err = ProxmoxClient::connect(&token_settings(&server), TIMEOUT).unwrap_err();
        assert!(matches!(err, PveError::Authentication(_)));
    }

    #[test]
    fn test_cluster_vms_queries_vm_resources() {
        let mut server = Server::new();
        let _version = mock_version(&mut server);
        let resources = server
            .mock("GET", "/api2/json/cluster/resources")
            .match_query(Matcher::UrlEncoded("type".into(), "vm".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"data": [
                    {"vmid": 100, "name": "web01", "node": "pve1", "type": "qemu"},
                    {"vmid": 101, "name": "web01", "node": "pve2", "type": "lxc"},
                    {"vmid": 102, "name": "db01", "node": "pve2", "type": "lxc"}
                ]})
                .to_string(),
            )
            .expect(3)
            .create();

        let client = ProxmoxClient::connect(&token_settings(&server), TIMEOUT).unwrap();
        assert_eq!(client.cluster_vms().unwrap().len(), 3);
        assert_eq!(client.vmids_by_name("web01").unwrap(), vec![100, 101]);
        assert_eq!(client.get_vm(102).unwrap().node, "pve2");
        resources.assert();
    }

    #[test]
    fn test_get_vm_unknown_vmid() {
        let mut server = Server::new();
        let _version = mock_version(&mut server);
        let _mock = server
            .mock("GET", "/api2/json/cluster/resources")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": []}).to_string())
            .create();

        let client = ProxmoxClient::connect(&token_settings(&server), TIMEOUT).unwrap();
        assert!(matches!(client.get_vm(999), Err(PveError::VmNotFound(999))));
    }

    #[test]
    fn test_api_error_carries_parameter_errors() {
        let mut server = Server::new();
        let _version = mock_version(&mut server);
        let _mock = server
            .mock("GET", "/api2/json/cluster/resources")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": null, "errors": {"type": "value 'vm' does not have a value in the enumeration\n"}}).to_string())
            .create();

        let client = ProxmoxClient::connect(&token_settings(&server), TIMEOUT).unwrap();
        match client.cluster_vms() {
            Err(PveError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(
                    message,
                    "type: value 'vm' does not have a value in the enumeration"
                );
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_host_is_reported() {
        // Nothing listens on port 9 of the loopback interface
        let err = ProxmoxClient::connect(&token_settings_at("http://127.0.0.1:9/api2/json"), TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, PveError::Authentication(_)));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("https://pve1:8006/api2/json").unwrap();
        let url = endpoint(&base, &["nodes", "pve 1", "qemu", "100", "snapshot"]).unwrap();
        assert_eq!(url.as_str(), "https://pve1:8006/api2/json/nodes/pve%201/qemu/100/snapshot");

        let trailing = Url::parse("https://pve1:8006/api2/json/").unwrap();
        assert_eq!(
            endpoint(&trailing, &["version"]).unwrap().as_str(),
            "https://pve1:8006/api2/json/version"
        );
    }

    #[test]
    fn test_api_error_message_fallbacks() {
        assert_eq!(
            api_error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
        assert_eq!(
            api_error_message(StatusCode::BAD_GATEWAY, "proxy went away"),
            "proxy went away"
        );
    }
}
