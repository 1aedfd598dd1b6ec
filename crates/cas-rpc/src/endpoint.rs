/// HTTP endpoint paths served by a storage node.
pub mod endpoints {
    pub const RPC: &str = "/";
    pub const HEALTH: &str = "/v1/health";
    pub const INFO: &str = "/v1/info";
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub jsonrpc: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            jsonrpc: super::envelope::JSONRPC_VERSION.into(),
        }
    }
}
