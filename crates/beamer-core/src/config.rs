//! Configuration management for beamer-tools.
//!
//! Holds the server settings (transport, bind address) in a TOML file.
//! Tracker credentials are not stored here; they come from the
//! environment, see [`crate::credentials`].
//!
//! - **macOS/Linux**: `~/.config/beamer-tools/config.toml`
//! - **Windows**: `%APPDATA%\beamer-tools\config.toml`
//!
//! # Example
//!
//! ```ignore
//! use beamer_core::config::{Config, TransportKind};
//!
//! let mut config = Config::load()?;
//! config.server.transport = TransportKind::Http;
//! config.server.port = 9000;
//! config.save()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "beamer-tools";

/// Default bind host for the HTTP transport.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for the HTTP transport.
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// Configuration structures
// =============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// MCP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Transport the MCP server listens on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// Stateless streamable HTTP
    Http,
}

impl FromStr for TransportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" | "streamable-http" => Ok(Self::Http),
            other => Err(Error::Config(format!(
                "Unknown transport '{}'. Expected stdio or http",
                other
            ))),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// MCP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub transport: TransportKind,
    /// Bind host for the HTTP transport
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port for the HTTP transport
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `server.port`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match section {
            "server" => match field {
                "transport" => self.server.transport = value.parse()?,
                "host" => self.server.host = value.to_string(),
                "port" => {
                    self.server.port = value.parse().map_err(|_| {
                        Error::Config(format!("Invalid port '{}'", value))
                    })?
                }
                _ => {
                    return Err(Error::Config(format!(
                        "Unknown server config field: {}",
                        field
                    )))
                }
            },
            _ => return Err(Error::Config(format!("Unknown config section: {}", section))),
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `server.host`)
    pub fn get(&self, key: &str) -> Result<String> {
        let (section, field) = split_key(key)?;

        match section {
            "server" => match field {
                "transport" => Ok(self.server.transport.to_string()),
                "host" => Ok(self.server.host.clone()),
                "port" => Ok(self.server.port.to_string()),
                _ => Err(Error::Config(format!(
                    "Unknown server config field: {}",
                    field
                ))),
            },
            _ => Err(Error::Config(format!("Unknown config section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once('.') {
        Some((section, field)) if !field.contains('.') => Ok((section, field)),
        _ => Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.transport, TransportKind::Stdio);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_set_and_get() {
        let mut config = Config::default();

        config.set("server.transport", "http").unwrap();
        config.set("server.host", "127.0.0.1").unwrap();
        config.set("server.port", "9000").unwrap();

        assert_eq!(config.get("server.transport").unwrap(), "http");
        assert_eq!(config.get("server.host").unwrap(), "127.0.0.1");
        assert_eq!(config.get("server.port").unwrap(), "9000");
        assert_eq!(config.server.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_key() {
        let mut config = Config::default();

        assert!(config.set("invalid", "value").is_err());
        assert!(config.set("too.many.parts", "value").is_err());
        assert!(config.set("unknown.field", "value").is_err());
        assert!(config.set("server.unknown", "value").is_err());
        assert!(config.get("server.unknown").is_err());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("server.port", "not-a-port").is_err());
        assert!(config.set("server.port", "70000").is_err());
        assert!(config.set("server.transport", "carrier-pigeon").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_transport_parse() {
        assert_eq!("stdio".parse::<TransportKind>().unwrap(), TransportKind::Stdio);
        assert_eq!("HTTP".parse::<TransportKind>().unwrap(), TransportKind::Http);
        assert_eq!(
            "streamable-http".parse::<TransportKind>().unwrap(),
            TransportKind::Http
        );
    }

    #[test]
    fn test_save_and_load() {
        let mut config = Config::default();
        config.server.transport = TransportKind::Http;
        config.server.port = 3001;

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[server]"));
        assert!(contents.contains("transport = \"http\""));
        assert!(contents.contains("port = 3001"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_nonexistent() {
        let path = PathBuf::from("/nonexistent/path/config.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[server]\nport = 1234\n").unwrap();

        let config = Config::load_from(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 1234);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.transport, TransportKind::Stdio);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[server\nport = ").unwrap();

        let err = Config::load_from(temp_file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
