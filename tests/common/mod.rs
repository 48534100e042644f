//! Common test utilities and helpers
//!
//! The popup is replaced by `/bin/sh -c <script>`. The script sees the
//! positional arguments the real popup would: `$1` title, `$2` message,
//! `$3` handoff path.

#![allow(dead_code)]

use ring_mcp_core::{Presenter, RequestCorrelator, ToolHandler};
use std::path::{Path, PathBuf};

/// Presenter that runs `script` under /bin/sh
pub fn sh_presenter(script: &str) -> Presenter {
    Presenter::new(
        "/bin/sh",
        vec!["-c".to_string(), script.to_string(), "ring-popup".to_string()],
    )
}

/// Correlator writing handoff artifacts into `dir`
pub fn create_test_correlator(dir: &Path, script: &str) -> RequestCorrelator {
    RequestCorrelator::new(sh_presenter(script), dir)
}

pub fn create_test_handler(dir: &Path, script: &str) -> ToolHandler {
    ToolHandler::new(create_test_correlator(dir, script))
}

/// Popup that answers with `text`
pub fn answer_script(text: &str) -> String {
    format!(
        r#"printf '%s' '{{"answered":true,"response":"{}"}}' > "$3""#,
        text
    )
}

/// Popup that answers with its own title (for isolation checks)
pub const ECHO_TITLE_SCRIPT: &str =
    r#"sleep 0.3; printf '{"answered":true,"response":"%s"}' "$1" > "$3""#;

/// Popup that dismisses
pub const DISMISS_SCRIPT: &str = r#"printf '%s' '{"answered":false,"response":""}' > "$3""#;

/// Popup that exits without writing anything
pub const SILENT_SCRIPT: &str = "exit 0";

/// Files currently in the handoff directory
pub fn handoff_entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}
