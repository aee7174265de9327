//! Snapshot store
//!
//! Holds the most recent directory snapshot. Reads are cache hits unless a
//! refresh is forced or nothing has been fetched yet. A failed fetch never
//! touches the held snapshot; the caller gets the error and can fall back
//! to an empty snapshot.

use chrono::{DateTime, Local};
use filewise_shared::{EnumerationError, Snapshot};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::enumerator::Enumerator;

/// Result of a read that never fails outright
#[derive(Debug)]
pub struct SnapshotRead {
    pub snapshot: Arc<Snapshot>,
    /// Set when the snapshot is an empty stand-in for a failed fetch
    pub error: Option<EnumerationError>,
}

impl SnapshotRead {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Owner of the live snapshot
pub struct SnapshotStore {
    enumerator: Box<dyn Enumerator>,
    current: Option<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new(enumerator: Box<dyn Enumerator>) -> Self {
        Self {
            enumerator,
            current: None,
        }
    }

    /// Cached snapshot, or a fresh one when forced or when none exists yet
    pub fn get(&mut self, force_refresh: bool) -> Result<Arc<Snapshot>, EnumerationError> {
        if !force_refresh {
            if let Some(snapshot) = &self.current {
                debug!(count = snapshot.total_count(), "snapshot cache hit");
                return Ok(Arc::clone(snapshot));
            }
        }

        let payload = self.enumerator.enumerate()?;
        payload.validate()?;
        let snapshot = Arc::new(Snapshot::new(payload.files, Local::now()));
        info!(
            count = snapshot.total_count(),
            source = %self.enumerator.describe(),
            "snapshot refreshed"
        );
        self.current = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Like [`get`](Self::get), but degrades to an empty snapshot on failure
    pub fn read(&mut self, force_refresh: bool) -> SnapshotRead {
        match self.get(force_refresh) {
            Ok(snapshot) => SnapshotRead {
                snapshot,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "directory enumeration failed, using empty snapshot");
                SnapshotRead {
                    snapshot: Arc::new(Snapshot::empty()),
                    error: Some(e),
                }
            }
        }
    }

    /// Force a refresh
    pub fn refresh(&mut self) -> Result<Arc<Snapshot>, EnumerationError> {
        self.get(true)
    }

    /// Drop the held snapshot so the next read refetches
    pub fn invalidate(&mut self) {
        debug!("snapshot invalidated");
        self.current = None;
    }

    /// Held snapshot without fetching
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.clone()
    }

    /// Capture time of the held snapshot
    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.current.as_ref().map(|s| s.captured_at())
    }

    pub fn source(&self) -> String {
        self.enumerator.describe()
    }
}
