//! Upstream fixture fetch tool.
//!
//! Calls the configured upstream API and forwards its JSON body. Every
//! upstream fault (connection, status, unreadable or unparsable body) is
//! reported as a failed [`ToolOutcome`], never as a protocol error.

use reqwest::{Client, Url};
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::core::config::UpstreamConfig;
use crate::core::error::{Error, Result};
use crate::domains::tools::{
    Schema, ToolDefinition, ToolError, ToolHandler, ToolOutcome, ValidatedArgs,
};

/// Query parameter carrying the API code.
const CODE_PARAM: &str = "code";

/// Retrieves fixture data from the upstream API.
#[derive(Clone)]
pub struct FetchExternalDataTool {
    client: Client,
    endpoint: Url,
}

impl FetchExternalDataTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "fetch_external_data";

    pub const TITLE: &'static str = "Fetch External Data";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Retrieve fixture data from the upstream API";

    /// Build the tool and its HTTP client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))?;

        let endpoint = endpoint_with_code(&config.api_base, config.api_code.expose());

        Ok(Self { client, endpoint })
    }

    /// Registry entry for this tool.
    pub fn definition(self) -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, Schema::empty(), Arc::new(self))
            .with_title(Self::TITLE)
    }

    /// Fetch the upstream payload and render it as pretty-printed JSON.
    #[instrument(skip(self), fields(host = self.endpoint.host_str().unwrap_or_default()))]
    pub async fn execute(&self) -> ToolOutcome {
        let response = match self.client.get(self.endpoint.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                return ToolOutcome::error(format!(
                    "Failed to reach external API: {}",
                    error_chain(&e)
                ));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or_default();
            return ToolOutcome::error(
                format!("External API returned {} {}", status.as_u16(), reason)
                    .trim_end()
                    .to_string(),
            );
        }

        let raw_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return ToolOutcome::error(format!(
                    "Failed to read external API response: {}",
                    error_chain(&e)
                ));
            }
        };
        debug!("Upstream response received: {} bytes", raw_body.len());

        let payload: serde_json::Value = match serde_json::from_str(&raw_body) {
            Ok(payload) => payload,
            Err(e) => {
                return ToolOutcome::error(format!(
                    "Failed to parse JSON response ({e}). Raw body: {raw_body}"
                ));
            }
        };

        match serde_json::to_string_pretty(&payload) {
            Ok(text) => {
                info!("Fetched upstream data");
                ToolOutcome::text(text)
            }
            Err(e) => ToolOutcome::error(format!("Failed to render JSON response: {e}")),
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for FetchExternalDataTool {
    async fn call(&self, _args: ValidatedArgs) -> std::result::Result<ToolOutcome, ToolError> {
        Ok(self.execute().await)
    }
}

/// `base` with its `code` query parameter set to `code`, replacing any
/// value already present. Other parameters keep their order.
fn endpoint_with_code(base: &Url, code: &str) -> Url {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != CODE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut endpoint = base.clone();
    endpoint
        .query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(CODE_PARAM, code);
    endpoint
}

/// Render an error with all of its sources, outermost first.
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
