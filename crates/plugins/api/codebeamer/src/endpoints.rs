//! Endpoint paths, relative to `{base_url}/v3/`.

/// Path listing all projects.
pub const PROJECTS_PATH: &str = "projects";

pub fn project_trackers_path(project_id: i64) -> String {
    format!("projects/{}/trackers", project_id)
}

pub fn tracker_items_path(tracker_id: i64) -> String {
    format!("trackers/{}/items", tracker_id)
}

/// Item path with the optional `version` and `baselineId` query parameters,
/// in that order.
pub fn item_path(item_id: i64, version: Option<i64>, baseline_id: Option<i64>) -> String {
    let mut path = format!("items/{}", item_id);

    let mut query = Vec::new();
    if let Some(version) = version {
        query.push(format!("version={}", version));
    }
    if let Some(baseline_id) = baseline_id {
        query.push(format!("baselineId={}", baseline_id));
    }

    if !query.is_empty() {
        path.push('?');
        path.push_str(&query.join("&"));
    }

    path
}

pub fn item_comments_path(item_id: i64) -> String {
    format!("items/{}/comments", item_id)
}
