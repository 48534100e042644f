//! ring-popup - notification window for ring-mcp
//!
//! Usage:
//!   ring-popup [TITLE] [MESSAGE] [HANDOFF_PATH]
//!
//! Arguments are strictly positional (titles may start with '-'), so they
//! are read directly instead of through clap.

use ring_mcp_core::popup::{self, PopupArgs};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("ring_mcp_core=warn"))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = PopupArgs::from_args(std::env::args().skip(1));
    debug!("Showing '{}'", args.title);

    match popup::run(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ring-popup: {}", e);
            ExitCode::FAILURE
        }
    }
}
