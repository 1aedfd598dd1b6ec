use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use cas_crypto::HashAlgorithm;
use cas_engine::{EngineConfig, DEFAULT_MAX_PAYLOAD_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 2 * DEFAULT_MAX_PAYLOAD_SIZE;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Node configuration, read once at startup.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Object directory. `None` keeps objects in memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub hash_algorithm: HashAlgorithm,
    /// Largest accepted write payload in bytes.
    pub max_payload_size: usize,
    /// Largest accepted HTTP body in bytes.
    pub max_request_bytes: usize,
    pub request_timeout_ms: u64,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            data_dir: None,
            hash_algorithm: HashAlgorithm::default(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            log_level: "info".into(),
        }
    }
}

impl ServerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.max_payload_size == 0 {
            return Err(ServerError::Config("max_payload_size must be positive".into()));
        }
        if self.max_request_bytes < self.max_payload_size {
            return Err(ServerError::Config(format!(
                "max_request_bytes ({}) is smaller than max_payload_size ({})",
                self.max_request_bytes, self.max_payload_size
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(ServerError::Config("request_timeout_ms must be positive".into()));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ServerError::Config(format!(
                "unknown log_level {:?}, expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            hash_algorithm: self.hash_algorithm,
            max_payload_size: self.max_payload_size,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
