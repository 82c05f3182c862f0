use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Connection settings for [`HttpObjectClient`](crate::HttpObjectClient).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API server, e.g. `https://192.168.99.100:8443`.
    pub server: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// PEM bundle used to verify the server.
    pub ca_file: Option<PathBuf>,
    /// PEM client certificate; requires `key_file`.
    pub cert_file: Option<PathBuf>,
    /// PEM private key for `cert_file`.
    pub key_file: Option<PathBuf>,
    pub insecure_skip_tls_verify: bool,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: "https://127.0.0.1:8443".into(),
            token: None,
            ca_file: None,
            cert_file: None,
            key_file: None,
            insecure_skip_tls_verify: false,
            timeout_secs: 30,
        }
    }
}
