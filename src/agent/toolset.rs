//! Remote toolsets reachable over MCP streamable HTTP.

use crate::config::ToolsetSettings;
use crate::error::{Result, SpotifyMcpError};
use crate::mcp::protocol::{
    Implementation, InitializeParams, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ToolCallParams, ToolCallResult, ToolsListResult, PROTOCOL_VERSION,
};
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const SESSION_HEADER: &str = "mcp-session-id";
const CLIENT_NAME: &str = "spotify-agent";

/// A named set of tools the agent may call.
#[async_trait]
pub trait Toolset: Send + Sync {
    fn name(&self) -> &str;

    /// Tools advertised by this toolset.
    fn tools(&self) -> &[ToolDefinition];

    /// Call a tool and return its text output.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String>;

    /// Release the connection.
    async fn close(&self) -> Result<()>;
}

/// MCP client for one tool host.
pub struct McpToolset {
    name: String,
    url: String,
    http: reqwest::Client,
    session_id: Option<String>,
    next_id: AtomicU64,
    tools: Vec<ToolDefinition>,
}

impl McpToolset {
    /// Connect to the host described by `settings`: initialize the session and
    /// fetch its tool list.
    pub async fn connect(settings: &ToolsetSettings, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in settings.expanded_headers()? {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| SpotifyMcpError::Config(format!("Invalid header '{}': {}", key, e)))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| SpotifyMcpError::Config(format!("Invalid value for '{}': {}", key, e)))?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let mut toolset = Self {
            name: settings.name.clone(),
            url: settings.url.clone(),
            http,
            session_id: None,
            next_id: AtomicU64::new(1),
            tools: Vec::new(),
        };

        info!("Connecting to toolset '{}' at {}", toolset.name, toolset.url);
        toolset.initialize().await?;
        toolset.tools = toolset.list_tools().await?;
        info!(
            "Toolset '{}' offers {} tools",
            toolset.name,
            toolset.tools.len()
        );
        Ok(toolset)
    }

    async fn initialize(&mut self) -> Result<()> {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({}),
            client_info: Implementation {
                name: CLIENT_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        let (result, session_id): (InitializeResult, _) = self
            .request_with_session("initialize", Some(serde_json::to_value(params)?))
            .await?;
        self.session_id = session_id;

        debug!(
            "Toolset '{}' is {} {} (protocol {})",
            self.name, result.server_info.name, result.server_info.version, result.protocol_version
        );

        self.notify("notifications/initialized").await
    }

    async fn list_tools(&self) -> Result<Vec<ToolDefinition>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let page: ToolsListResult = self.request("tools/list", params).await?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(tools)
    }

    fn post(&self) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json, text/event-stream")
            .header("mcp-protocol-version", PROTOCOL_VERSION);
        if let Some(session) = &self.session_id {
            builder = builder.header(SESSION_HEADER, session);
        }
        builder
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Option<Value>) -> Result<T> {
        Ok(self.request_with_session(method, params).await?.0)
    }

    /// Send a request and decode its result, also returning any session id
    /// the host assigned.
    async fn request_with_session<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<(T, Option<String>)> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(Some(json!(id)), method, params);
        debug!("-> {} {} (id {})", self.name, method, id);

        let response = self.post().json(&request).send().await?;
        let status = response.status();
        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let is_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SpotifyMcpError::Agent(format!(
                "Toolset '{}' returned HTTP {} for {}: {}",
                self.name, status, method, body
            )));
        }

        let reply = if is_stream {
            parse_event_stream(&body, &json!(id))?
        } else {
            serde_json::from_str::<JsonRpcResponse>(&body)?
        };

        if let Some(error) = reply.error {
            return Err(SpotifyMcpError::Mcp {
                code: error.code,
                message: error.message,
            });
        }

        let result = reply.result.unwrap_or(Value::Null);
        Ok((serde_json::from_value(result)?, session_id))
    }

    async fn notify(&self, method: &str) -> Result<()> {
        let request = JsonRpcRequest::new(None, method, None);
        let response = self.post().json(&request).send().await?;
        if !response.status().is_success() {
            warn!(
                "Toolset '{}' answered {} with HTTP {}",
                self.name,
                method,
                response.status()
            );
        }
        Ok(())
    }
}

/// Find the JSON-RPC response with `id` in a `text/event-stream` body.
fn parse_event_stream(body: &str, id: &Value) -> Result<JsonRpcResponse> {
    let normalized = body.replace("\r\n", "\n");
    for event in normalized.split("\n\n") {
        let data: Vec<&str> = event
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|d| d.strip_prefix(' ').unwrap_or(d))
            .collect();
        if data.is_empty() {
            continue;
        }

        if let Ok(reply) = serde_json::from_str::<JsonRpcResponse>(&data.join("\n")) {
            if reply.id.as_ref() == Some(id) {
                return Ok(reply);
            }
        }
    }

    Err(SpotifyMcpError::Agent(format!(
        "No response with id {} in event stream",
        id
    )))
}

#[async_trait]
impl Toolset for McpToolset {
    fn name(&self) -> &str {
        &self.name
    }

    fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        let params = ToolCallParams {
            name: name.to_string(),
            arguments: Some(arguments),
        };
        let result: ToolCallResult = self
            .request("tools/call", Some(serde_json::to_value(params)?))
            .await?;

        let text = result.joined_text();
        if result.is_error.unwrap_or(false) {
            Ok(format!("Tool error: {}", text))
        } else {
            Ok(text)
        }
    }

    async fn close(&self) -> Result<()> {
        let Some(session) = &self.session_id else {
            debug!("Toolset '{}' has no session to terminate", self.name);
            return Ok(());
        };

        let response = self
            .http
            .delete(&self.url)
            .header(SESSION_HEADER, session)
            .send()
            .await?;
        // 405 means the host does not support explicit termination.
        if !response.status().is_success() && response.status() != reqwest::StatusCode::METHOD_NOT_ALLOWED {
            warn!(
                "Toolset '{}' session termination returned HTTP {}",
                self.name,
                response.status()
            );
        }
        info!("Disconnected from toolset '{}'", self.name);
        Ok(())
    }
}
