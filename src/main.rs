//! ring-mcp - Notification Bridge for MCP Clients
//!
//! Main entry point: runs the MCP server on stdio, fires one-off
//! notifications from the terminal, and registers the server with a client.

use clap::{Parser, Subcommand};
use ring_mcp_core::{
    error::{Result, RingError},
    setup::{default_client_config_path, Setup, SetupOutcome},
    types::{DEFAULT_MESSAGE, DEFAULT_TITLE},
    McpServer, NotificationRequest, RequestCorrelator, RingConfig, ToolHandler,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ring-mcp")]
#[command(about = "Notification bell with replies for MCP clients", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Config file (overrides RING_MCP_CONFIG and the default location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server (stdio mode, the default)
    Serve,

    /// Show a notification now and print the result
    Ring {
        /// Notification title
        #[arg(short, long, default_value = DEFAULT_TITLE)]
        title: String,

        /// Notification message
        #[arg(short, long, default_value = DEFAULT_MESSAGE)]
        message: String,
    },

    /// Register ring-mcp in the MCP client configuration
    Setup {
        /// Client configuration file (default: ~/.claude.json)
        #[arg(long)]
        config_file: Option<PathBuf>,

        /// Overwrite an existing entry without asking
        #[arg(long)]
        force: bool,
    },
}

/// Start MCP server in stdio mode
async fn start_mcp_server(config_path: Option<&Path>) -> Result<()> {
    debug!("Starting MCP server...");

    let config = RingConfig::load(config_path)?;
    let correlator = RequestCorrelator::from_config(&config);
    debug!(
        "Presenter: {}, handoff dir: {}",
        correlator.presenter().program().display(),
        correlator.handoff_dir().display()
    );

    let server = McpServer::new(ToolHandler::new(correlator));

    // Run server with graceful shutdown on signals
    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping MCP server...");
        }
    }

    info!("MCP server shut down complete");
    Ok(())
}

async fn ring_once(config_path: Option<&Path>, title: String, message: String) -> Result<()> {
    let config = RingConfig::load(config_path)?;
    let correlator = RequestCorrelator::from_config(&config);

    let outcome = correlator
        .ring(&NotificationRequest::new(title, message))
        .await?;
    println!("{}", outcome);
    Ok(())
}

fn run_setup(config_file: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_file
        .or_else(default_client_config_path)
        .ok_or_else(|| RingError::Setup("Could not determine home directory".to_string()))?;
    let server_binary = std::env::current_exe()?;

    let setup = Setup {
        config_path,
        server_binary,
        force,
    };

    let stdin = std::io::stdin();
    match setup.run(stdin.lock(), std::io::stdout())? {
        SetupOutcome::Registered => println!("\n🎉 Setup complete! Restart your MCP client to use ring.\n"),
        SetupOutcome::KeptExisting => println!("\n✅ Setup complete! Existing entry unchanged.\n"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "ring_mcp={level},ring_mcp_core={level}",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    debug!("ring-mcp v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => start_mcp_server(config_path).await,
        Commands::Ring { title, message } => ring_once(config_path, title, message).await,
        Commands::Setup { config_file, force } => run_setup(config_file, force),
    }
}
