//! Request correlation between a `ring` call and its popup process
//!
//! One call, one token, one child, one artifact:
//! 1. lease a token from the in-flight table (names the artifact)
//! 2. spawn the popup with `[title, message, artifact_path]`
//! 3. await the child's exit without blocking other requests
//! 4. read the artifact once, delete it, map it to a [`RingOutcome`]

pub mod handoff;
pub mod presenter;

pub use handoff::{HandoffLease, HandoffToken, InFlightTable};
pub use presenter::Presenter;

use crate::config::RingConfig;
use crate::error::{Result, RingError};
use crate::types::{ArtifactOutcome, NotificationRequest, RingOutcome};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bridges one popup process lifetime to one pending response
#[derive(Debug, Clone)]
pub struct RequestCorrelator {
    presenter: Presenter,
    handoff_dir: PathBuf,
    timeout: Option<Duration>,
    in_flight: InFlightTable,
}

impl RequestCorrelator {
    pub fn new(presenter: Presenter, handoff_dir: impl Into<PathBuf>) -> Self {
        Self {
            presenter,
            handoff_dir: handoff_dir.into(),
            timeout: None,
            in_flight: InFlightTable::new(),
        }
    }

    pub fn from_config(config: &RingConfig) -> Self {
        Self::new(Presenter::from_config(config), config.handoff_dir())
            .with_timeout(config.presenter_timeout())
    }

    /// Kill popups that stay open longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn handoff_dir(&self) -> &Path {
        &self.handoff_dir
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Calls currently waiting on a popup
    pub fn in_flight(&self) -> &InFlightTable {
        &self.in_flight
    }

    /// Show a notification and wait for the user's decision
    ///
    /// Fails only when the popup cannot be started (including an unusable
    /// handoff directory). Everything that happens after a successful spawn
    /// resolves to a [`RingOutcome`]. Dropping the returned future kills the
    /// popup and removes its artifact.
    pub async fn ring(&self, request: &NotificationRequest) -> Result<RingOutcome> {
        // Without a handoff location the popup has nowhere to answer.
        tokio::fs::create_dir_all(&self.handoff_dir)
            .await
            .map_err(|source| RingError::LaunchFailure {
                program: self.presenter.program().to_path_buf(),
                source,
            })?;

        let lease = self.in_flight.lease(&self.handoff_dir);
        info!("Ringing '{}' (token {})", request.title, lease.token());

        let mut child = self.presenter.spawn(request, lease.path())?;

        let status = match self.timeout {
            None => child.wait().await,
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!(
                        "Notification {} still open after {:?}, closing it",
                        lease.token(),
                        limit
                    );
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill notification process: {}", e);
                    }
                    child.wait().await
                }
            },
        };

        match status {
            Ok(status) if status.success() => debug!("Notification {} closed", lease.token()),
            Ok(status) => warn!("Notification {} exited with {}", lease.token(), status),
            Err(e) => warn!("Failed to wait for notification {}: {}", lease.token(), e),
        }

        let artifact = lease.collect().await;
        if let ArtifactOutcome::Recorded(record) = &artifact {
            if let Some(error) = &record.error {
                warn!("Notification {} reported: {}", lease.token(), error);
            }
        }

        let outcome = RingOutcome::from(artifact);
        info!("Notification {} resolved: {}", lease.token(), outcome);
        Ok(outcome)
    }
}
