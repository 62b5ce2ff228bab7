//! Collaborator traits
//!
//! The rollup engine never touches storage or prices itself. A full analysis
//! and the deletion of a persisted run are reached through these two traits,
//! so the snapshot owner can be driven by the file-backed store or by a test
//! double.

use crate::error::Result;
use crate::rollup_types::Snapshot;
use crate::types::RunId;
use async_trait::async_trait;

/// Produces a complete, freshly computed snapshot from persisted runs and
/// current prices.
#[async_trait]
pub trait BulkAnalyzer: Send + Sync {
    /// Run a full analysis pass.
    async fn analyze(&self) -> Result<Snapshot>;
}

/// Durable storage for run records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Remove one run from durable storage.
    async fn delete_persisted(&self, id: &RunId) -> Result<()>;
}
