//! Tool handlers for MCP server.
//!
//! Maps a `tools/call` invocation onto a [`TrackerProvider`] operation and
//! returns the provider's envelope, serialized as JSON text, as the tool
//! output. The envelope is passed through untouched; only an unknown tool
//! or malformed arguments produce a protocol error.

use std::sync::Arc;

use beamer_core::{Envelope, TrackerProvider, DEFAULT_COMMENT_FORMAT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::protocol::{JsonRpcError, ToolCallResult, ToolDefinition};
use crate::tools::{available_tools, ToolName};

/// Tool handler that executes tools against a tracker provider.
pub struct ToolHandler {
    provider: Arc<dyn TrackerProvider>,
    tools: Vec<ToolDefinition>,
}

impl ToolHandler {
    /// Create a new tool handler. The tool table is built once here.
    pub fn new(provider: Arc<dyn TrackerProvider>) -> Self {
        Self {
            provider,
            tools: available_tools(),
        }
    }

    /// Get available tool definitions.
    pub fn available_tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Execute a tool by name with arguments.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Option<Value>,
    ) -> Result<ToolCallResult, JsonRpcError> {
        let tool = ToolName::from_name(name).ok_or_else(|| {
            tracing::warn!("Unknown tool: {}", name);
            JsonRpcError::unknown_tool(name)
        })?;

        let envelope = self.dispatch(tool, arguments).await?;

        tracing::debug!(
            tool = name,
            provider = self.provider.provider_name(),
            success = envelope.is_success(),
            "Tool finished"
        );

        ToolCallResult::json(&envelope).map_err(|e| JsonRpcError::internal_error(&e.to_string()))
    }

    async fn dispatch(
        &self,
        tool: ToolName,
        arguments: Option<Value>,
    ) -> Result<Envelope, JsonRpcError> {
        let provider = self.provider.as_ref();

        let envelope = match tool {
            ToolName::GetProjects => {
                let _: NoParams = parse_params(arguments)?;
                provider.list_projects().await
            }
            ToolName::GetTrackersByProjectId => {
                let params: ProjectParams = parse_params(arguments)?;
                provider.list_trackers(params.project_id).await
            }
            ToolName::GetTrackerItems => {
                let params: TrackerParams = parse_params(arguments)?;
                provider.list_tracker_items(params.tracker_id).await
            }
            ToolName::GetTrackerItem => {
                let params: GetItemParams = parse_params(arguments)?;
                provider
                    .get_item(params.item_id, params.version, params.baseline_id)
                    .await
            }
            ToolName::GetTrackerItemComments => {
                let params: ItemParams = parse_params(arguments)?;
                provider.list_item_comments(params.item_id).await
            }
            ToolName::PostTrackerItemComment => {
                let params: PostCommentParams = parse_params(arguments)?;
                let format = params
                    .comment_format
                    .as_deref()
                    .unwrap_or(DEFAULT_COMMENT_FORMAT);
                provider
                    .post_item_comment(params.item_id, &params.comment_text, format)
                    .await
            }
        };

        Ok(envelope)
    }
}

/// Missing arguments are treated as an empty object.
fn parse_params<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T, JsonRpcError> {
    let value = match arguments {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))
}

/// Parameters for get_projects tool.
#[derive(Debug, Deserialize)]
struct NoParams {}

/// Parameters for get_trackers_by_project_id tool.
#[derive(Debug, Deserialize)]
struct ProjectParams {
    project_id: i64,
}

/// Parameters for get_tracker_items tool.
#[derive(Debug, Deserialize)]
struct TrackerParams {
    tracker_id: i64,
}

/// Parameters for get_tracker_item_comments tool.
#[derive(Debug, Deserialize)]
struct ItemParams {
    item_id: i64,
}

/// Parameters for get_tracker_item tool.
#[derive(Debug, Deserialize)]
struct GetItemParams {
    item_id: i64,
    version: Option<i64>,
    baseline_id: Option<i64>,
}

/// Parameters for post_tracker_item_comment tool.
#[derive(Debug, Deserialize)]
struct PostCommentParams {
    item_id: i64,
    comment_text: String,
    comment_format: Option<String>,
}
