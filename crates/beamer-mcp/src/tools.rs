//! MCP tool definitions.
//!
//! The tool set is fixed: one tool per tracker operation. Names and
//! parameter names are part of the public interface and must stay stable.

use serde_json::{json, Value};

use crate::protocol::ToolDefinition;

/// Registered tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetProjects,
    GetTrackersByProjectId,
    GetTrackerItems,
    GetTrackerItem,
    GetTrackerItemComments,
    PostTrackerItemComment,
}

impl ToolName {
    /// All tools, in the order they are listed to clients.
    pub const ALL: [ToolName; 6] = [
        ToolName::GetProjects,
        ToolName::GetTrackersByProjectId,
        ToolName::GetTrackerItems,
        ToolName::GetTrackerItem,
        ToolName::GetTrackerItemComments,
        ToolName::PostTrackerItemComment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetProjects => "get_projects",
            Self::GetTrackersByProjectId => "get_trackers_by_project_id",
            Self::GetTrackerItems => "get_tracker_items",
            Self::GetTrackerItem => "get_tracker_item",
            Self::GetTrackerItemComments => "get_tracker_item_comments",
            Self::PostTrackerItemComment => "post_tracker_item_comment",
        }
    }

    /// Look up a tool by its exposed name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::GetProjects => {
                "Get projects from Codebeamer using the /v3/projects API endpoint. \
                 Returns the projects list or error information."
            }
            Self::GetTrackersByProjectId => {
                "Get trackers for a specific Codebeamer project \
                 (/v3/projects/{projectId}/trackers)."
            }
            Self::GetTrackerItems => {
                "Get the items within a Codebeamer tracker (/v3/trackers/{trackerId}/items)."
            }
            Self::GetTrackerItem => {
                "Get a specific Codebeamer tracker item (/v3/items/{itemId}), \
                 optionally at a given version and/or baseline."
            }
            Self::GetTrackerItemComments => "Get the comments of a tracker item by item id.",
            Self::PostTrackerItemComment => "Post a comment to a tracker item.",
        }
    }

    /// JSON schema of the tool's arguments.
    pub fn input_schema(self) -> Value {
        match self {
            Self::GetProjects => json!({
                "type": "object",
                "properties": {}
            }),
            Self::GetTrackersByProjectId => json!({
                "type": "object",
                "properties": {
                    "project_id": {
                        "type": "integer",
                        "description": "The ID of the project to retrieve trackers for"
                    }
                },
                "required": ["project_id"]
            }),
            Self::GetTrackerItems => json!({
                "type": "object",
                "properties": {
                    "tracker_id": {
                        "type": "integer",
                        "description": "The ID of the tracker to retrieve items for"
                    }
                },
                "required": ["tracker_id"]
            }),
            Self::GetTrackerItem => json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The ID of the tracker item to retrieve"
                    },
                    "version": {
                        "type": "integer",
                        "description": "Version of the tracker item (optional)"
                    },
                    "baseline_id": {
                        "type": "integer",
                        "description": "Baseline ID (optional)"
                    }
                },
                "required": ["item_id"]
            }),
            Self::GetTrackerItemComments => json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The ID of the tracker item to retrieve comments for"
                    }
                },
                "required": ["item_id"]
            }),
            Self::PostTrackerItemComment => json!({
                "type": "object",
                "properties": {
                    "item_id": {
                        "type": "integer",
                        "description": "The ID of the tracker item to post the comment to"
                    },
                    "comment_text": {
                        "type": "string",
                        "description": "The text of the comment"
                    },
                    "comment_format": {
                        "type": "string",
                        "description": "The format of the comment, either \"PlainText\" or \"HTML\" (default: \"PlainText\")",
                        "default": "PlainText"
                    }
                },
                "required": ["item_id", "comment_text"]
            }),
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Available MCP tools.
pub fn available_tools() -> Vec<ToolDefinition> {
    ToolName::ALL.into_iter().map(ToolName::definition).collect()
}
