//! Codebeamer API client implementation.
//!
//! [`CodebeamerClient::execute`] is the single request path: it resolves
//! credentials, builds one authenticated request, and folds every outcome
//! (success, remote error, timeout, connect failure, anything else) into an
//! [`Envelope`]. The domain operations only choose a path, method and
//! payload.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use beamer_core::{
    CredentialProvider, Credentials, EnvCredentials, Envelope, FailureKind, HttpMethod, Payload,
    TrackerProvider,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

use crate::endpoints::{
    item_comments_path, item_path, project_trackers_path, tracker_items_path, PROJECTS_PATH,
};

/// Upper bound for a single request, connect to last byte.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "beamer-tools";

const TIMEOUT_DETAILS: &str = "The request to the Codebeamer API timed out";
const CONNECT_DETAILS: &str = "Could not connect to the Codebeamer instance";

/// Codebeamer API client.
///
/// Holds no connection state: each call builds its own HTTP client and drops
/// it before returning, so nothing is shared between concurrent calls.
#[derive(Clone)]
pub struct CodebeamerClient {
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
}

impl CodebeamerClient {
    /// Create a client that resolves credentials from `provider` on every call.
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self {
            credentials: provider,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Create a client reading the `CODEBEAMER_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(Arc::new(EnvCredentials::new()))
    }

    /// Override the request timeout (tests use a short one).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Perform one request against `{base_url}/v3/{path}`.
    ///
    /// Never fails: every outcome is encoded in the returned envelope.
    pub async fn execute(
        &self,
        path: &str,
        method: HttpMethod,
        payload: Option<Payload>,
    ) -> Envelope {
        let verb = match &method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Unsupported(name) => {
                warn!(method = %name, "Rejecting unsupported HTTP method");
                return Envelope::local(
                    FailureKind::UnsupportedMethod,
                    format!("Method {} is not supported", name),
                );
            }
        };

        let credentials = self.credentials.resolve();
        let url = credentials.api_url(path);
        debug!(method = %method, url = %url, "Codebeamer request");

        let payload = if method.carries_body() { payload } else { None };

        match self.send(verb, &url, &credentials, payload).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(url = %url, error = %e, "Codebeamer request failed");
                classify_error(&e)
            }
        }
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: &str,
        credentials: &Credentials,
        payload: Option<Payload>,
    ) -> reqwest::Result<Envelope> {
        let client = self.http_client()?;
        let json_body = !payload.as_ref().is_some_and(Payload::is_multipart);

        let mut builder = self.request(&client, method, url, credentials, json_body);
        builder = match payload {
            Some(Payload::Json(body)) => builder.json(&body),
            Some(Payload::Multipart(fields)) => builder.multipart(multipart_form(fields)),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let is_json = declares_json(&response);
        let bytes = response.bytes().await?;

        let body = match body_value(is_json, &bytes) {
            Ok(body) => body,
            Err(e) => {
                warn!(status = status, error = %e, "Invalid JSON in Codebeamer response");
                return Ok(Envelope::local(FailureKind::Unexpected, e.to_string()));
            }
        };

        if matches!(status, 200 | 201) {
            Ok(Envelope::success(body))
        } else {
            warn!(status = status, "Codebeamer API error response");
            Ok(Envelope::remote(status, body))
        }
    }

    /// Fresh HTTP client for one call, without an idle connection pool.
    /// Redirects are not followed; a 3xx is reported like any other status.
    fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::none())
            .build()
    }

    /// Build request with auth and content negotiation headers.
    fn request(
        &self,
        client: &reqwest::Client,
        method: reqwest::Method,
        url: &str,
        credentials: &Credentials,
        json_body: bool,
    ) -> reqwest::RequestBuilder {
        let builder = client
            .request(method, url)
            .header(
                AUTHORIZATION,
                basic_auth(&credentials.username, &credentials.password),
            )
            .header(ACCEPT, "application/json");

        if json_body {
            builder.header(CONTENT_TYPE, "application/json")
        } else {
            builder
        }
    }
}

/// `Basic base64(username:password)`.
fn basic_auth(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, password))
    )
}

fn multipart_form(fields: Vec<(String, String)>) -> reqwest::multipart::Form {
    fields
        .into_iter()
        .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
            form.text(name, value)
        })
}

fn declares_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("application/json"))
}

/// Parsed JSON when the response declares JSON and has a body, raw text otherwise.
fn body_value(is_json: bool, bytes: &[u8]) -> serde_json::Result<Value> {
    if is_json && !bytes.is_empty() {
        serde_json::from_slice(bytes)
    } else {
        Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }
}

fn classify_error(err: &reqwest::Error) -> Envelope {
    if err.is_timeout() {
        Envelope::local(FailureKind::Timeout, TIMEOUT_DETAILS)
    } else if err.is_connect() {
        Envelope::local(FailureKind::Connection, CONNECT_DETAILS)
    } else {
        Envelope::local(FailureKind::Unexpected, err.to_string())
    }
}

#[async_trait]
impl TrackerProvider for CodebeamerClient {
    fn provider_name(&self) -> &'static str {
        "codebeamer"
    }

    async fn list_projects(&self) -> Envelope {
        self.execute(PROJECTS_PATH, HttpMethod::Get, None).await
    }

    async fn list_trackers(&self, project_id: i64) -> Envelope {
        self.execute(&project_trackers_path(project_id), HttpMethod::Get, None)
            .await
    }

    async fn list_tracker_items(&self, tracker_id: i64) -> Envelope {
        self.execute(&tracker_items_path(tracker_id), HttpMethod::Get, None)
            .await
    }

    async fn get_item(
        &self,
        item_id: i64,
        version: Option<i64>,
        baseline_id: Option<i64>,
    ) -> Envelope {
        self.execute(
            &item_path(item_id, version, baseline_id),
            HttpMethod::Get,
            None,
        )
        .await
    }

    async fn list_item_comments(&self, item_id: i64) -> Envelope {
        self.execute(&item_comments_path(item_id), HttpMethod::Get, None)
            .await
    }

    async fn post_item_comment(
        &self,
        item_id: i64,
        comment: &str,
        comment_format: &str,
    ) -> Envelope {
        let form = Payload::Multipart(vec![
            ("comment".to_string(), comment.to_string()),
            ("commentFormat".to_string(), comment_format.to_string()),
        ]);
        self.execute(&item_comments_path(item_id), HttpMethod::Post, Some(form))
            .await
    }
}

// =============================================================================
// Tests
// =============================================================================
