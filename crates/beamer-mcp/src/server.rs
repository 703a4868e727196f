//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. Handle tool calls - execute tools via the tracker provider
//! 3. Shutdown - stop on EOF (stdio) or when the listener stops (HTTP)
//!
//! The server itself is stateless: the only shared data is the read-only
//! tool table inside [`ToolHandler`], so every request can be served on its
//! own task.

use std::sync::Arc;

use beamer_core::TrackerProvider;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;

use crate::handlers::ToolHandler;
use crate::protocol::{
    Implementation, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, RequestId, ServerCapabilities, ToolCallParams, ToolsCapability,
    ToolsListResult, MCP_VERSION,
};
use crate::transport::{IncomingMessage, ReadOutcome, StdioTransport};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "beamer-mcp";

/// MCP server for beamer-tools.
#[derive(Clone)]
pub struct McpServer {
    handler: Arc<ToolHandler>,
}

impl McpServer {
    /// Create a new MCP server exposing `provider` as tools.
    pub fn new(provider: Arc<dyn TrackerProvider>) -> Self {
        Self {
            handler: Arc::new(ToolHandler::new(provider)),
        }
    }

    pub fn handler(&self) -> &ToolHandler {
        &self.handler
    }

    /// Serve on stdin/stdout until EOF.
    pub async fn run_stdio(&self) -> beamer_core::Result<()> {
        self.run(StdioTransport::stdio()).await
    }

    /// Serve newline-delimited JSON-RPC on the given transport until EOF.
    ///
    /// Each request is handled on its own task; a single writer task owns the
    /// output so responses are written whole, in completion order.
    pub async fn run<R, W>(&self, transport: StdioTransport<R, W>) -> beamer_core::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        tracing::info!(
            "Starting MCP server on stdio with {} tools",
            self.handler.available_tools().len()
        );

        let (mut reader, mut writer) = transport.into_split();
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer_task = tokio::spawn(async move {
            while let Some(response) = rx.recv().await {
                if let Err(e) = writer.write_response(&response).await {
                    tracing::error!("Failed to write response: {}", e);
                    break;
                }
            }
        });

        let result = loop {
            match reader.read_message().await {
                Ok(ReadOutcome::Message(msg)) => {
                    let server = self.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Some(response) = server.handle_message(msg).await {
                            // Receiver is gone only if the writer failed; nothing left to do.
                            let _ = tx.send(response);
                        }
                    });
                }
                Ok(ReadOutcome::Invalid(err)) => {
                    let _ = tx.send(JsonRpcResponse::error(RequestId::Null, err));
                }
                Ok(ReadOutcome::Eof) => {
                    tracing::info!("EOF received, shutting down");
                    break Ok(());
                }
                Err(e) => {
                    tracing::error!("Transport error: {}", e);
                    break Err(beamer_core::Error::Io(e));
                }
            }
        };

        // Let in-flight requests finish and flush their responses.
        drop(tx);
        if let Err(e) = writer_task.await {
            tracing::error!("Writer task failed: {}", e);
        }

        tracing::info!("MCP server stopped");
        result
    }

    /// Handle an incoming message.
    pub async fn handle_message(&self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None // Notifications don't get responses
            }
        }
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {} (id: {:?})", req.method, req.id);

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "tools/list" => self.handle_tools_list(req.id),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            "ping" => self.handle_ping(req.id),
            method => {
                tracing::warn!("Unknown method: {}", method);
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    /// Handle notifications (no response).
    pub fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" => {
                tracing::debug!("Request cancelled by client");
            }
            _ => {
                tracing::debug!("Ignoring notification: {}", method);
            }
        }
    }

    /// Handle initialize request.
    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init_params) => {
                    tracing::info!(
                        "Client: {} v{} (protocol: {})",
                        init_params.client_info.name,
                        init_params.client_info.version,
                        init_params.protocol_version
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to parse initialize params: {}", e);
                }
            }
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Tools for reading and commenting on Codebeamer projects, trackers and items. \
                 Each tool returns {\"result\": ...} on success, or an object with \"error\" \
                 (and \"status_code\" or \"details\") on failure."
                    .to_string(),
            ),
        };

        JsonRpcResponse::ok(id, &result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.handler.available_tools().to_vec(),
        };
        JsonRpcResponse::ok(id, &result)
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(&e.to_string()),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        tracing::info!("Calling tool: {}", params.name);

        match self.handler.execute(&params.name, params.arguments).await {
            Ok(result) => JsonRpcResponse::ok(id, &result),
            Err(err) => JsonRpcResponse::error(id, err),
        }
    }

    /// Handle ping request.
    fn handle_ping(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::ok(id, &serde_json::json!({}))
    }
}
