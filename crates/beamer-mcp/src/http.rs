//! Streamable HTTP transport.
//!
//! Each JSON-RPC message is POSTed to `/mcp` and answered in the HTTP
//! response body. No session is kept between requests.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::protocol::{JsonRpcResponse, RequestId};
use crate::server::McpServer;
use crate::transport::{parse_message, IncomingMessage};

/// Path that accepts JSON-RPC messages.
pub const MCP_PATH: &str = "/mcp";

/// Build the HTTP router for `server`.
pub fn router(server: McpServer) -> Router {
    Router::new()
        .route(MCP_PATH, post(handle_mcp))
        .route("/health", get(health))
        .with_state(server)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(server: McpServer, addr: &str) -> beamer_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| beamer_core::Error::Transport(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(
        "MCP server listening on http://{}{} with {} tools",
        addr,
        MCP_PATH,
        server.handler().available_tools().len()
    );

    axum::serve(listener, router(server))
        .await
        .map_err(|e| beamer_core::Error::Transport(e.to_string()))
}

async fn handle_mcp(State(server): State<McpServer>, body: String) -> Response {
    match parse_message(&body) {
        Ok(msg @ IncomingMessage::Request(_)) => match server.handle_message(msg).await {
            Some(response) => (StatusCode::OK, Json(response)).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },
        Ok(msg @ IncomingMessage::Notification(_)) => {
            server.handle_message(msg).await;
            StatusCode::ACCEPTED.into_response()
        }
        Err(err) => {
            tracing::warn!("Rejected HTTP message: {}", err.message);
            (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(RequestId::Null, err)),
            )
                .into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{JsonRpcError, ToolCallResult};
    use axum::body::Body;
    use axum::http::Request;
    use beamer_codebeamer::CodebeamerClient;
    use beamer_core::{Credentials, StaticCredentials};
    use http_body_util::BodyExt;
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;

    fn server_for(base_url: String) -> McpServer {
        let credentials = StaticCredentials(Credentials::new(base_url, "alice", "secret"));
        McpServer::new(Arc::new(CodebeamerClient::new(Arc::new(credentials))))
    }

    async fn post_mcp(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(MCP_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn tool_output(response: &Value) -> Value {
        let result: ToolCallResult = serde_json::from_value(response["result"].clone()).unwrap();
        serde_json::from_str(result.first_text().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(server_for("http://127.0.0.1:1".to_string()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_tools_list_over_http() {
        let app = router(server_for("http://127.0.0.1:1".to_string()));
        let (status, body) =
            post_mcp(app, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_notification_is_accepted_without_body() {
        let app = router(server_for("http://127.0.0.1:1".to_string()));
        let (status, body) = post_mcp(
            app,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = router(server_for("http://127.0.0.1:1".to_string()));
        let (status, body) = post_mcp(app, "{oops").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], JsonRpcError::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_serve_reports_bind_failure() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let err = serve(server_for("http://127.0.0.1:1".to_string()), &addr)
            .await
            .unwrap_err();

        assert!(matches!(err, beamer_core::Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_tool_call_reaches_codebeamer() {
        let mock = MockServer::start_async().await;
        let projects = mock
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v3/projects")
                    .header("Authorization", "Basic YWxpY2U6c2VjcmV0");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!([{"id": 1, "name": "Demo"}]));
            })
            .await;

        let app = router(server_for(mock.base_url()));
        let (status, body) = post_mcp(
            app,
            r#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{"name":"get_projects"}}"#,
        )
        .await;

        projects.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "a");
        assert_eq!(
            tool_output(&body),
            json!({"result": [{"id": 1, "name": "Demo"}]})
        );
    }

    #[tokio::test]
    async fn test_slow_failing_call_does_not_block_others() {
        let mock = MockServer::start_async().await;
        mock.mock_async(|when, then| {
            when.method(GET).path("/v3/items/1");
            then.status(500)
                .header("content-type", "application/json")
                .json_body(json!({"message": "boom"}))
                .delay(Duration::from_millis(1500));
        })
        .await;
        mock.mock_async(|when, then| {
            when.method(GET).path("/v3/projects");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([]));
        })
        .await;

        let server = server_for(mock.base_url());

        let slow = tokio::spawn(post_mcp(
            router(server.clone()),
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"get_tracker_item","arguments":{"item_id":1}}}"#,
        ));

        // Give the slow request a head start.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = Instant::now();
        let (_, fast) = post_mcp(
            router(server),
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"get_projects"}}"#,
        )
        .await;
        assert!(started.elapsed() < Duration::from_millis(1000));
        assert_eq!(tool_output(&fast), json!({"result": []}));

        let (_, slow) = slow.await.unwrap();
        assert_eq!(
            tool_output(&slow),
            json!({"status_code": 500, "error": {"message": "boom"}})
        );
    }
}
