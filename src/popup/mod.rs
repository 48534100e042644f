//! Presentation process (`ring-popup`)
//!
//! Shows one notification, waits for exactly one decision, records it to
//! the handoff path given on the command line and exits. A failure before
//! the user decides still records a dismissal carrying the error.

pub mod app;
pub mod terminal;

pub use app::PopupApp;

use crate::error::Result;
use crate::types::{DecisionRecord, DEFAULT_MESSAGE, DEFAULT_TITLE};
use anyhow::Context;
use crossterm::event::{self, Event};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use terminal::PopupTerminal;
use tracing::{debug, error, warn};

/// How often the bell rings while the popup waits
pub const RING_INTERVAL: Duration = Duration::from_millis(1200);

/// Input poll interval
const TICK: Duration = Duration::from_millis(100);

/// Positional popup arguments: `[title] [message] [handoff_path]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupArgs {
    pub title: String,
    pub message: String,
    pub handoff_path: Option<PathBuf>,
}

impl PopupArgs {
    /// Parse arguments (without the program name), filling in defaults
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());

        Self {
            title: non_empty(args.next()).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            message: non_empty(args.next()).unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            handoff_path: non_empty(args.next()).map(PathBuf::from),
        }
    }
}

/// Writes the decision record at most once per process
#[derive(Debug)]
pub struct DecisionSink {
    path: Option<PathBuf>,
    written: AtomicBool,
}

impl DecisionSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            written: AtomicBool::new(false),
        }
    }

    /// Record `decision` unless something was already recorded.
    /// Returns whether this call claimed the single write.
    pub fn record(&self, decision: &DecisionRecord) -> bool {
        if self.written.swap(true, Ordering::SeqCst) {
            debug!("Decision already recorded, ignoring {:?}", decision);
            return false;
        }

        let Some(path) = &self.path else {
            debug!("No handoff path, decision not recorded");
            return true;
        };

        let result = serde_json::to_vec(decision)
            .map_err(std::io::Error::from)
            .and_then(|bytes| std::fs::write(path, bytes));
        if let Err(e) = result {
            error!("Failed to write response to {}: {}", path.display(), e);
        }
        true
    }
}

/// Show the popup and record the user's decision
pub fn run(args: PopupArgs) -> Result<DecisionRecord> {
    let sink = Arc::new(DecisionSink::new(args.handoff_path.clone()));
    install_panic_hook(Arc::clone(&sink));

    match interact(&args) {
        Ok(decision) => {
            sink.record(&decision);
            Ok(decision)
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            warn!("Notification failed: {}", reason);
            sink.record(&DecisionRecord::failed(reason));
            Err(e.into())
        }
    }
}

fn interact(args: &PopupArgs) -> anyhow::Result<DecisionRecord> {
    let mut app = PopupApp::new(args.title.clone(), args.message.clone());
    let mut term = PopupTerminal::new()?;

    term.ring()?;
    let mut last_ring = Instant::now();

    loop {
        term.terminal_mut()
            .draw(|frame| app.render(frame))
            .context("draw popup")?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if let Some(decision) = app.handle_key(key) {
                    return Ok(decision);
                }
            }
        }

        if last_ring.elapsed() >= RING_INTERVAL {
            term.ring()?;
            last_ring = Instant::now();
        }
    }
}

fn install_panic_hook(sink: Arc<DecisionSink>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        terminal::restore();
        sink.record(&DecisionRecord::failed(info.to_string()));
        previous(info);
    }));
}
