//! Snapshot owner
//!
//! The [`Tracker`] holds the current [`Snapshot`] and is the only place that
//! replaces it. Full reloads go through a [`BulkAnalyzer`], deletions through
//! a [`RecordStore`] followed by an incremental [`remove_record`].
//!
//! Only one reload or delete may run at a time. A call made while another is
//! in flight fails with [`AbyssalError::ReloadInProgress`] and leaves the
//! held snapshot as it was.

use crate::error::{AbyssalError, Result};
use crate::rollup::{build, remove_record};
use crate::types::{PriceLookup, RunId, RunRecord, Snapshot};
use abyssal_core::provider::{BulkAnalyzer, RecordStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Clears the in-flight flag when dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(flag))
            .map_err(|_| AbyssalError::ReloadInProgress)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owner of the current snapshot
pub struct Tracker<A, S> {
    analyzer: Arc<A>,
    store: Arc<S>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    in_flight: AtomicBool,
}

impl<A: BulkAnalyzer, S: RecordStore> Tracker<A, S> {
    /// Create a tracker with no snapshot loaded yet
    pub fn new(analyzer: Arc<A>, store: Arc<S>) -> Self {
        Self {
            analyzer,
            store,
            snapshot: RwLock::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Current snapshot, if one has been loaded
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Whether a reload or delete is running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run a full analysis and replace the snapshot
    ///
    /// # Errors
    ///
    /// Returns `ReloadInProgress` if another operation is running, or the
    /// analyzer's error. The held snapshot is unchanged on error.
    pub async fn reload(&self) -> Result<Arc<Snapshot>> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let snapshot = Arc::new(self.analyzer.analyze().await?);
        info!("Loaded snapshot with {} runs", snapshot.len());
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Rebuild the snapshot from the given records, keeping the held prices
    pub async fn light_reload(&self, records: Vec<RunRecord>) -> Result<Arc<Snapshot>> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        let prices = self
            .snapshot
            .read()
            .await
            .as_ref()
            .map(|current| current.price_lookup.clone())
            .unwrap_or_else(PriceLookup::new);

        let snapshot = Arc::new(build(records, prices));
        debug!("Light reload rebuilt {} runs", snapshot.len());
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Delete a run from storage, then drop it from the snapshot
    ///
    /// Returns whether the run was present in the held snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ReloadInProgress` if another operation is running, or the
    /// store's error. The snapshot is only touched after the store succeeds.
    pub async fn delete_run(&self, id: &RunId) -> Result<bool> {
        let _guard = InFlight::acquire(&self.in_flight)?;

        self.store.delete_persisted(id).await?;

        let mut held = self.snapshot.write().await;
        let Some(current) = held.as_ref() else {
            debug!("Deleted {} with no snapshot loaded", id);
            return Ok(false);
        };

        if current.find(id).is_none() {
            return Ok(false);
        }

        let next = Arc::new(remove_record(current, id));
        *held = Some(next);
        Ok(true)
    }
}
