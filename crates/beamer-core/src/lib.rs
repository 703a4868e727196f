//! Core traits, types, and error handling for beamer-tools.
//!
//! This crate provides the foundational abstractions shared by the
//! Codebeamer client, the MCP server and the CLI.

pub mod config;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod types;

pub use credentials::{CredentialProvider, Credentials, EnvCredentials, StaticCredentials};
pub use error::{Error, Result};
pub use provider::{TrackerProvider, DEFAULT_COMMENT_FORMAT};
pub use types::{Envelope, FailureKind, HttpMethod, Payload};
