//! ring-mcp - Notification Bridge for MCP Clients
//!
//! Exposes a single MCP tool, `ring`, that pops up a notification and hands
//! the user's reply back to the caller:
//! - One short-lived popup process per call
//! - Per-call handoff artifacts tracked in an in-flight table
//! - Concurrent calls isolated by unique tokens, no shared mutable state
//!
//! # Architecture
//!
//! - **Types**: request, decision record and outcome mapping
//! - **Correlator**: spawns the popup, awaits it, recovers the decision
//! - **MCP**: JSON-RPC 2.0 server over stdio
//! - **Popup**: the terminal notification window (`ring-popup`)
//! - **Setup**: registers the server with an MCP client
//!
//! # Example
//!
//! ```ignore
//! use ring_mcp_core::{NotificationRequest, RequestCorrelator, RingConfig};
//!
//! #[tokio::main]
//! async fn main() -> ring_mcp_core::Result<()> {
//!     let config = RingConfig::load(None)?;
//!     let correlator = RequestCorrelator::from_config(&config);
//!
//!     let outcome = correlator
//!         .ring(&NotificationRequest::new("Build finished", "Deploy now?"))
//!         .await?;
//!     println!("{}", outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod correlator;
pub mod error;
pub mod mcp;
pub mod popup;
pub mod setup;
pub mod types;

// Re-export commonly used types
pub use config::RingConfig;
pub use correlator::{Presenter, RequestCorrelator};
pub use error::{Result, RingError};
pub use mcp::{McpServer, ToolHandler};
pub use types::{ArtifactOutcome, DecisionRecord, NotificationRequest, RingOutcome};
