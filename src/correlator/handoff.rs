//! Handoff artifacts and the in-flight token table
//!
//! Every `ring` call leases a fresh token from the [`InFlightTable`]. The
//! lease owns the artifact path for the lifetime of the call: the popup
//! writes it once, [`HandoffLease::collect`] reads it once, and dropping the
//! lease unregisters the token and removes anything left on disk.

use crate::types::{ArtifactOutcome, DecisionRecord};
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

/// Prefix of every handoff artifact file name
pub const ARTIFACT_PREFIX: &str = "ring-response-";

/// Per-call identifier naming one handoff artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandoffToken(Uuid);

impl HandoffToken {
    /// Generate a fresh random token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// File name of the artifact backing this token
    pub fn file_name(&self) -> String {
        format!("{}{}.json", ARTIFACT_PREFIX, self.0)
    }
}

impl Default for HandoffToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandoffToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Table of tokens whose calls are still waiting on a popup
#[derive(Debug, Clone, Default)]
pub struct InFlightTable {
    entries: Arc<Mutex<HashMap<HandoffToken, PathBuf>>>,
}

impl InFlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new token whose artifact lives in `dir`
    pub fn lease(&self, dir: &Path) -> HandoffLease {
        let token = HandoffToken::new();
        let path = dir.join(token.file_name());

        let previous = self.lock().insert(token, path.clone());
        debug_assert!(previous.is_none(), "handoff token reused");

        debug!("Leased handoff token {} -> {}", token, path.display());
        HandoffLease {
            token,
            path,
            table: self.clone(),
        }
    }

    /// Number of calls currently waiting on a popup
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Artifact path registered for `token`, if still in flight
    pub fn path_of(&self, token: &HandoffToken) -> Option<PathBuf> {
        self.lock().get(token).cloned()
    }

    fn release(&self, token: &HandoffToken) -> Option<PathBuf> {
        self.lock().remove(token)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HandoffToken, PathBuf>> {
        // Entries are plain data; a panic elsewhere cannot leave them half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive ownership of one handoff artifact for one call
#[derive(Debug)]
pub struct HandoffLease {
    token: HandoffToken,
    path: PathBuf,
    table: InFlightTable,
}

impl HandoffLease {
    pub fn token(&self) -> HandoffToken {
        self.token
    }

    /// Where the popup must write its decision
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the artifact once and delete it
    pub async fn collect(&self) -> ArtifactOutcome {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No handoff artifact for {}", self.token);
                return ArtifactOutcome::Missing;
            }
            Err(e) => {
                self.discard().await;
                return ArtifactOutcome::Unreadable(e.to_string());
            }
        };

        self.discard().await;

        match serde_json::from_slice::<DecisionRecord>(&bytes) {
            Ok(record) => ArtifactOutcome::Recorded(record),
            Err(e) => {
                warn!("Malformed handoff artifact for {}: {}", self.token, e);
                ArtifactOutcome::Unreadable(e.to_string())
            }
        }
    }

    async fn discard(&self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed handoff artifact {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove handoff artifact {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for HandoffLease {
    fn drop(&mut self) {
        self.table.release(&self.token);

        // Covers calls that never reached collect() (spawn error, cancellation).
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed orphaned handoff artifact {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove handoff artifact {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tokens_are_unique() {
        let a = HandoffToken::new();
        let b = HandoffToken::new();
        assert_ne!(a, b);
        assert_ne!(a.file_name(), b.file_name());
        assert!(a.file_name().starts_with(ARTIFACT_PREFIX));
        assert!(a.file_name().ends_with(".json"));
    }

    #[test]
    fn test_lease_registers_and_releases() {
        let dir = TempDir::new().unwrap();
        let table = InFlightTable::new();

        let lease = table.lease(dir.path());
        let token = lease.token();
        assert_eq!(table.len(), 1);
        assert_eq!(table.path_of(&token).as_deref(), Some(lease.path()));

        drop(lease);
        assert!(table.is_empty());
        assert!(table.path_of(&token).is_none());
    }

    #[tokio::test]
    async fn test_collect_missing() {
        let dir = TempDir::new().unwrap();
        let table = InFlightTable::new();
        let lease = table.lease(dir.path());

        assert_eq!(lease.collect().await, ArtifactOutcome::Missing);
    }

    #[tokio::test]
    async fn test_collect_reads_once_and_deletes() {
        let dir = TempDir::new().unwrap();
        let table = InFlightTable::new();
        let lease = table.lease(dir.path());

        std::fs::write(lease.path(), r#"{"answered":true,"response":"on my way"}"#).unwrap();

        assert_eq!(
            lease.collect().await,
            ArtifactOutcome::Recorded(DecisionRecord::answered("on my way"))
        );
        assert!(!lease.path().exists());
        assert_eq!(lease.collect().await, ArtifactOutcome::Missing);
    }

    #[tokio::test]
    async fn test_collect_malformed_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let table = InFlightTable::new();
        let lease = table.lease(dir.path());

        std::fs::write(lease.path(), "{\"answered\": tru").unwrap();

        assert!(matches!(
            lease.collect().await,
            ArtifactOutcome::Unreadable(_)
        ));
        assert!(!lease.path().exists());
    }

    #[test]
    fn test_drop_removes_uncollected_artifact() {
        let dir = TempDir::new().unwrap();
        let table = InFlightTable::new();
        let lease = table.lease(dir.path());
        let path = lease.path().to_path_buf();

        std::fs::write(&path, "{}").unwrap();
        drop(lease);

        assert!(!path.exists());
    }
}
