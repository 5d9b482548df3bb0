//! Configuration management for the MCP server.
//!
//! Configuration is read from environment variables (optionally seeded from a
//! `.env` file). Parsing goes through [`Config::from_lookup`], which takes any
//! key lookup function so it can be exercised without touching the process
//! environment.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::error::{Error, Result};
use super::transport::HttpConfig;
use crate::domains::tools::DEFAULT_TOOL_TIMEOUT;

/// Default timeout for upstream HTTP calls made by tools.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Names an explicit environment file to load instead of `./.env`.
const ENV_FILE_VAR: &str = "MCP_ENV_FILE";

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP transport configuration.
    pub http: HttpConfig,

    /// Upstream API used by `fetch_external_data`.
    pub upstream: UpstreamConfig,

    /// Tool execution limits.
    pub tools: ToolsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "hello-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API (`API_BASE`).
    pub api_base: Url,

    /// Access code sent as the `code` query parameter (`API_CODE`).
    pub api_code: Secret,

    /// Timeout applied to each upstream request.
    pub timeout: Duration,
}

/// Tool execution limits.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Upper bound for a single tool call.
    pub timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

/// A string value that is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Config {
    /// Load configuration for the server process.
    ///
    /// When `MCP_ENV_FILE` is set, that file is read instead of `./.env`.
    pub fn load() -> Result<Self> {
        match std::env::var_os(ENV_FILE_VAR) {
            Some(path) => Self::from_env_file(path),
            None => Self::from_env(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a `.env` file, falling back to the process
    /// environment for keys the file does not set.
    ///
    /// The file is read without modifying the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let vars = dotenvy::from_path_iter(path)
            .and_then(|iter| iter.collect::<std::result::Result<HashMap<_, _>, _>>())
            .map_err(|e| Error::config(format!("Cannot read {}: {e}", path.display())))?;
        info!("Loaded environment file {}", path.display());

        Self::from_lookup(|key| vars.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// - `API_BASE` (required) - upstream base URL
    /// - `API_CODE` (required) - upstream access code
    /// - `PORT` (default 8000), `MCP_HTTP_HOST`, `MCP_HTTP_PATH`, `MCP_HTTP_CORS`,
    ///   `MCP_HTTP_MAX_BODY_BYTES` - HTTP listener
    /// - `MCP_TOOL_TIMEOUT_SECS` (default 30) - max seconds per tool call
    /// - `MCP_UPSTREAM_TIMEOUT_SECS` (default 10) - max seconds per upstream request
    /// - `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut server = ServerConfig::default();
        if let Some(name) = lookup("MCP_SERVER_NAME") {
            server.name = name;
        }

        let mut logging = LoggingConfig::default();
        if let Some(level) = lookup("MCP_LOG_LEVEL") {
            logging.level = level;
        }

        let api_base = require(&lookup, "API_BASE")?;
        let api_base = Url::parse(&api_base)
            .map_err(|e| Error::config(format!("API_BASE is not a valid URL: {e}")))?;
        let api_code = Secret::new(require(&lookup, "API_CODE")?);

        let upstream = UpstreamConfig {
            api_base,
            api_code,
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "MCP_UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),
        };

        let tools = ToolsConfig {
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "MCP_TOOL_TIMEOUT_SECS",
                DEFAULT_TOOL_TIMEOUT.as_secs(),
            )?),
        };

        Ok(Self {
            server,
            logging,
            http: HttpConfig::from_lookup(&lookup)?,
            upstream,
            tools,
        })
    }

    /// A configuration suitable for unit tests.
    #[cfg(test)]
    pub(crate) fn for_tests(api_base: &str) -> Self {
        let api_base = api_base.to_string();
        Self::from_lookup(move |key| match key {
            "API_BASE" => Some(api_base.clone()),
            "API_CODE" => Some("test-code".to_string()),
            _ => None,
        })
        .expect("test configuration must be valid")
    }
}

/// Read a required, non-empty variable.
pub(crate) fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional variable, using `default` when it is unset.
pub(crate) fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::config(format!("{key} has invalid value '{raw}': {e}"))),
        None => Ok(default),
    }
}
