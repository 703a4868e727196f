//! Beamer CLI - command-line interface for beamer-tools.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use beamer_codebeamer::CodebeamerClient;
use beamer_core::config::{Config, TransportKind};
use beamer_core::{CredentialProvider, EnvCredentials};
use beamer_mcp::McpServer;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beamer")]
#[command(author, version, long_about = None)]
#[command(about = "Beamer - Codebeamer tools for AI assistants")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server
    Serve {
        /// Transport to serve on (stdio or http)
        #[arg(short, long)]
        transport: Option<TransportKind>,

        /// Host to bind for the http transport
        #[arg(long)]
        host: Option<String>,

        /// Port to bind for the http transport
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Get a configuration value (e.g. server.port)
    Get { key: String },

    /// Set a configuration value (e.g. server.transport http)
    Set { key: String, value: String },

    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging. stdout belongs to the stdio transport.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };

    match cli.command {
        Some(Commands::Serve {
            transport,
            host,
            port,
        }) => {
            let config = Config::load_from(&config_path)?;
            let settings = ServeSettings::resolve(&config, transport, host, port);
            serve(settings).await?;
        }
        Some(Commands::Config { command }) => {
            let output = run_config(command, &config_path)?;
            println!("{}", output);
        }
        None => {
            println!("Beamer - Codebeamer tools for AI assistants");
            println!("Run with --help for usage information");
        }
    }

    Ok(())
}

/// Effective server settings: command-line flags over the config file.
#[derive(Debug, PartialEq)]
struct ServeSettings {
    transport: TransportKind,
    bind_address: String,
}

impl ServeSettings {
    fn resolve(
        config: &Config,
        transport: Option<TransportKind>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Self {
        let mut server = config.server.clone();
        if let Some(transport) = transport {
            server.transport = transport;
        }
        if let Some(host) = host {
            server.host = host;
        }
        if let Some(port) = port {
            server.port = port;
        }

        Self {
            transport: server.transport,
            bind_address: server.bind_address(),
        }
    }
}

async fn serve(settings: ServeSettings) -> anyhow::Result<()> {
    let credentials = EnvCredentials::new();
    if credentials.resolve().base_url.is_empty() {
        let [base_url, _, _] = credentials.variable_names();
        tracing::warn!(
            "{} is not set; tool calls will fail until it is configured",
            base_url
        );
    }

    let client = CodebeamerClient::new(Arc::new(credentials));
    let server = McpServer::new(Arc::new(client));

    match settings.transport {
        TransportKind::Stdio => server.run_stdio().await?,
        TransportKind::Http => {
            if let Err(e) = beamer_mcp::http::serve(server, &settings.bind_address).await {
                tracing::error!("HTTP server failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn run_config(command: ConfigCommands, path: &Path) -> anyhow::Result<String> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load_from(path)?;
            toml::to_string_pretty(&config).context("Failed to render configuration")
        }
        ConfigCommands::Get { key } => Ok(Config::load_from(path)?.get(&key)?),
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_from(path)?;
            config.set(&key, &value)?;
            config.save_to(path)?;
            Ok(format!("Set {} = {}", key, value))
        }
        ConfigCommands::Path => Ok(path.display().to_string()),
    }
}
