//! MCP server implementation.

use super::protocol::*;
use crate::tools::{Capability, ToolHost};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

const SERVER_NAME: &str = "Spotify Server";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server exposing the Spotify tools. Holds no per-session state.
#[derive(Clone)]
pub struct McpServer {
    host: ToolHost,
}

impl McpServer {
    pub fn new(host: ToolHost) -> Self {
        Self { host }
    }

    /// Run over stdio: one JSON-RPC message per line on stdin, responses on
    /// stdout. Returns when stdin closes.
    pub async fn run_stdio(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        info!("Spotify MCP server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line).await {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                stdout.write_all(out.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"));
            }
        };

        let id = value.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                &format!("Invalid request: {}", e),
            )),
        }
    }

    /// Handle a single JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("<- {}", request.method);

        if request.is_notification() {
            match request.method.as_str() {
                "notifications/initialized" | "initialized" => debug!("Client initialized"),
                "notifications/cancelled" => debug!("Client cancelled a request"),
                other => debug!("Ignoring notification {}", other),
            }
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        if let Some(params) = params.and_then(|p| serde_json::from_value::<InitializeParams>(p).ok()) {
            info!(
                "Client {} {} connected (protocol {})",
                params.client_info.name, params.client_info.version, params.protocol_version
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({ "tools": { "listChanged": false } }),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            instructions: None,
        };

        to_response(id, &result)
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.host.definitions(),
            next_cursor: None,
        };
        to_response(id, &result)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, INVALID_PARAMS, &format!("Invalid params: {}", e))
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let result = match params.name.parse::<Capability>() {
            Ok(capability) => {
                ToolCallResult::text(self.host.call(capability, params.arguments).await)
            }
            Err(message) => ToolCallResult::error(message),
        };

        to_response(id, &result)
    }
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, -32603, &format!("Internal error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::stub::StubSpotify;
    use std::sync::Arc;

    fn server() -> (McpServer, Arc<StubSpotify>) {
        let stub = Arc::new(StubSpotify::new());
        (McpServer::new(ToolHost::new(stub.clone())), stub)
    }

    async fn roundtrip(server: &McpServer, message: Value) -> Value {
        let response = server.handle_message(&message.to_string()).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let (server, _) = server();
        let response = roundtrip(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": { "name": "test", "version": "0.0.1" }
                }
            }),
        )
        .await;
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["serverInfo"]["name"], "Spotify Server");
        assert_eq!(response["result"]["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let (server, _) = server();
        let message = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
        assert!(server.handle_message(&message.to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let (server, _) = server();
        let response = roundtrip(&server, json!({ "jsonrpc": "2.0", "id": "a", "method": "tools/list" })).await;
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 5);
        assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
    }

    #[tokio::test]
    async fn test_tools_call_returns_text() {
        let (server, stub) = server();
        let response = roundtrip(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": { "name": "playback", "arguments": { "action": "pause" } }
            }),
        )
        .await;
        assert_eq!(response["result"]["content"][0]["text"], "Playback paused.");
        assert!(response["result"].get("isError").is_none());
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_validation_failures_are_not_protocol_errors() {
        let (server, stub) = server();
        let response = roundtrip(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": { "name": "queue", "arguments": { "action": "shuffle" } }
            }),
        )
        .await;
        assert!(response.get("error").is_none());
        assert!(response["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Unknown queue action: shuffle"));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (server, _) = server();
        let response = roundtrip(
            &server,
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": { "name": "search_audiobook", "arguments": { "query": "x" } }
            }),
        )
        .await;
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(response["result"]["content"][0]["text"], "Unknown tool: search_audiobook");
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let (server, _) = server();
        let response = server.handle_message("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, PARSE_ERROR);

        let response = roundtrip(&server, json!({ "jsonrpc": "2.0", "id": 5, "method": "resources/list" })).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = roundtrip(&server, json!({ "jsonrpc": "2.0", "id": 6, "method": "tools/call" })).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }
}
