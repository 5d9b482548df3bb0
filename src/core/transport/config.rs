//! Transport configuration types.

use serde::{Deserialize, Serialize};

use crate::core::config::parse_or;
use crate::core::error::{Error, Result};

/// Default request body limit (4 MiB).
const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rpc_path() -> String {
    "/mcp".to_string()
}

fn default_cors() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl HttpConfig {
    /// Create an HTTP config for the given port and host.
    pub fn new(port: u16, host: impl Into<String>) -> Self {
        Self {
            port,
            host: host.into(),
            ..Default::default()
        }
    }

    /// Load HTTP config from a key lookup (see [`Config::from_lookup`](crate::core::Config::from_lookup)).
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let rpc_path = lookup("MCP_HTTP_PATH").unwrap_or(defaults.rpc_path);
        if !rpc_path.starts_with('/') {
            return Err(Error::config(format!(
                "MCP_HTTP_PATH must start with '/', got '{rpc_path}'"
            )));
        }

        let enable_cors = lookup("MCP_HTTP_CORS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(defaults.enable_cors);

        Ok(Self {
            port: parse_or(lookup, "PORT", defaults.port)?,
            host: lookup("MCP_HTTP_HOST").unwrap_or(defaults.host),
            rpc_path,
            enable_cors,
            max_body_bytes: parse_or(lookup, "MCP_HTTP_MAX_BODY_BYTES", defaults.max_body_bytes)?,
        })
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        format!("HTTP on {}{}", self.address(), self.rpc_path)
    }
}
