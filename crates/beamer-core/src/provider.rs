//! Provider trait for issue-tracking services.

use async_trait::async_trait;

use crate::types::Envelope;

/// Comment format used when the caller does not pick one.
pub const DEFAULT_COMMENT_FORMAT: &str = "PlainText";

/// Read/write operations against a project tracker.
///
/// Every operation returns the tracker's answer as an [`Envelope`]. IDs and
/// the comment format are forwarded as given; the tracker validates them.
#[async_trait]
pub trait TrackerProvider: Send + Sync {
    /// Get the provider name (e.g., "codebeamer")
    fn provider_name(&self) -> &'static str;

    /// List all projects visible to the user
    async fn list_projects(&self) -> Envelope;

    /// List the trackers of a project
    async fn list_trackers(&self, project_id: i64) -> Envelope;

    /// List the items of a tracker
    async fn list_tracker_items(&self, tracker_id: i64) -> Envelope;

    /// Get a single item, optionally at a given version and/or baseline
    async fn get_item(
        &self,
        item_id: i64,
        version: Option<i64>,
        baseline_id: Option<i64>,
    ) -> Envelope;

    /// List the comments on an item
    async fn list_item_comments(&self, item_id: i64) -> Envelope;

    /// Post a comment on an item
    async fn post_item_comment(
        &self,
        item_id: i64,
        comment: &str,
        comment_format: &str,
    ) -> Envelope;
}
