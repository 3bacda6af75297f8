//! Streamable HTTP transport.
//!
//! Stateless: every POST carries one JSON-RPC message and is answered with a
//! plain JSON body. No session ids are issued and no server-initiated stream
//! is offered.

use super::server::McpServer;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

/// Build the router with the MCP endpoint mounted at `path`.
pub fn router(server: McpServer, path: &str) -> Router {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            &path,
            post(handle_post).get(method_not_allowed).delete(handle_delete),
        )
        .route("/success", get(success).post(success))
        .route("/health", get(health))
        .layer(cors)
        .with_state(server)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(server: McpServer, addr: &str, path: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(server, path)).await?;
    Ok(())
}

async fn handle_post(State(server): State<McpServer>, body: String) -> impl IntoResponse {
    match server.handle_message(&body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn handle_delete() -> impl IntoResponse {
    debug!("Session termination requested; host is stateless");
    StatusCode::OK
}

async fn method_not_allowed() -> impl IntoResponse {
    StatusCode::METHOD_NOT_ALLOWED
}

async fn success() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "message": "The request was processed successfully."
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::spotify::stub::StubSpotify;
    use crate::tools::ToolHost;
    use serde_json::Value;
    use std::sync::Arc;

    /// Serve a host backed by `stub` on an ephemeral port; returns the base URL.
    pub(crate) async fn spawn_host(stub: Arc<StubSpotify>) -> String {
        let app = router(McpServer::new(ToolHost::new(stub)), "/mcp");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_success_endpoint() {
        let base = spawn_host(Arc::new(StubSpotify::new())).await;
        let http = reqwest::Client::new();

        for response in [
            http.get(format!("{}/success", base)).send().await.unwrap(),
            http.post(format!("{}/success", base)).send().await.unwrap(),
        ] {
            assert_eq!(response.status(), reqwest::StatusCode::OK);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body["status"], "success");
            assert_eq!(body["message"], "The request was processed successfully.");
        }
    }

    #[tokio::test]
    async fn test_post_tool_call() {
        let stub = Arc::new(StubSpotify::new());
        let base = spawn_host(stub.clone()).await;

        let response = reqwest::Client::new()
            .post(format!("{}/mcp", base))
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": { "name": "playback", "arguments": { "action": "skip", "num_skips": 2 } }
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["id"], 7);
        assert_eq!(body["result"]["content"][0]["text"], "Skipped to next track.");
        assert_eq!(stub.last_call().unwrap().args, json!({ "n": 2 }));
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let base = spawn_host(Arc::new(StubSpotify::new())).await;
        let response = reqwest::Client::new()
            .post(format!("{}/mcp", base))
            .json(&json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_get_is_not_offered() {
        let base = spawn_host(Arc::new(StubSpotify::new())).await;
        let response = reqwest::get(format!("{}/mcp", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    }
}
