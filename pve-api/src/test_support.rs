use std::time::Duration;

use mockito::ServerGuard;
use pve_config::{ConnectionSettings, Credentials};
use serde_json::json;

pub const TIMEOUT: Duration = Duration::from_secs(5);

fn api_root(server: &ServerGuard) -> String {
    format!("{}/api2/json", server.url())
}

/// Token credentials pointed at `api_url`.
pub fn token_settings_at(api_url: &str) -> ConnectionSettings {
    ConnectionSettings {
        host: "127.0.0.1".to_string(),
        port: 8006,
        user: "root@pam".to_string(),
        credentials: Credentials::Token {
            id: "ci".to_string(),
            secret: "0000-1111".to_string(),
        },
        validate_certs: false,
        api_url: Some(api_url.to_string()),
    }
}

pub fn token_settings(server: &ServerGuard) -> ConnectionSettings {
    token_settings_at(&api_root(server))
}

pub fn password_settings(server: &ServerGuard) -> ConnectionSettings {
    ConnectionSettings {
        credentials: Credentials::Password("hunter2".to_string()),
        ..token_settings(server)
    }
}

pub fn mock_version(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/api2/json/version")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": {"version": "8.2.4", "release": "8.2"}}).to_string())
        .create()
}
