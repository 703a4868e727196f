//! Credentials for the Codebeamer REST API.
//!
//! Credentials are resolved on every request and never cached, so a change
//! to the environment is picked up by the next call. Missing values resolve
//! to empty strings; the remote side then rejects the request.

use std::fmt;

/// Default prefix for the credential environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "CODEBEAMER";

/// Base URL, username and password for one Codebeamer instance.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Full URL of a v3 API endpoint, e.g. `items/42` ->
    /// `https://host/cb/api/v3/items/42`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/v3/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<hidden>")
            .finish()
    }
}

/// Source of credentials, consulted once per request.
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self) -> Credentials;
}

/// Reads `{PREFIX}_BASE_URL`, `{PREFIX}_USERNAME` and `{PREFIX}_PASSWORD`
/// from the process environment.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    prefix: String,
}

impl EnvCredentials {
    /// Use the `CODEBEAMER_*` variables.
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Names of the three variables this provider reads.
    pub fn variable_names(&self) -> [String; 3] {
        [
            format!("{}_BASE_URL", self.prefix),
            format!("{}_USERNAME", self.prefix),
            format!("{}_PASSWORD", self.prefix),
        ]
    }

    fn var(name: &str) -> String {
        std::env::var(name).unwrap_or_default()
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredentials {
    fn resolve(&self) -> Credentials {
        let [base_url, username, password] = self.variable_names();
        Credentials {
            base_url: Self::var(&base_url),
            username: Self::var(&username),
            password: Self::var(&password),
        }
    }
}

/// Fixed credentials, for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn resolve(&self) -> Credentials {
        self.0.clone()
    }
}
