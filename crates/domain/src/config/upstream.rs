use serde::{Deserialize, Serialize};

/// The single fixed upstream resolver unresolved queries are forwarded to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_server")]
    pub server: String,

    /// Bound on the upstream UDP receive. Expiry is a forwarding failure.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_server() -> String {
    "8.8.8.8:53".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}
