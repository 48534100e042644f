//! Launching the presentation process

use crate::config::RingConfig;
use crate::error::{Result, RingError};
use crate::types::NotificationRequest;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

/// How to start the popup: an executable plus leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presenter {
    program: PathBuf,
    args: Vec<String>,
}

impl Presenter {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &RingConfig) -> Self {
        Self::new(config.presenter_program(), config.presenter.args.clone())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the child command: `program [args..] title message handoff_path`
    ///
    /// Arguments go straight to the OS as an argv vector, so embedded spaces
    /// and quotes reach the popup untouched without any shell quoting.
    /// The child is killed if the call is dropped before it exits.
    pub fn command(&self, request: &NotificationRequest, handoff_path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&request.title)
            .arg(&request.message)
            .arg(handoff_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }

    /// Start the popup
    pub fn spawn(&self, request: &NotificationRequest, handoff_path: &Path) -> Result<Child> {
        let child = self
            .command(request, handoff_path)
            .spawn()
            .map_err(|source| RingError::LaunchFailure {
                program: self.program.clone(),
                source,
            })?;

        debug!(
            "Spawned {} (pid {:?})",
            self.program.display(),
            child.id()
        );
        Ok(child)
    }
}
