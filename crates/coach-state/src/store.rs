//! Storage trait definitions for MR Coach feedback
//!
//! These traits define the persistence abstractions consumed by the review
//! pipeline (write side) and the dashboard daemon (read side):
//! - `FeedbackStore`: append-only feedback record persistence with listing
//! - `StoreProvider`: yields one scoped store connection per call
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One persisted piece of review feedback.
///
/// Created by the pipeline's metrics recorder, one per suggestion that was
/// attempted as a comment. Append-only: records are never updated or
/// deleted by the pipeline; the dashboard only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Hosting-platform project identifier
    pub project_id: String,
    /// Merge request internal ID within the project
    pub merge_request_iid: String,
    /// Path of the reviewed file
    pub file_path: String,
    /// Line the suggestion anchors to, when the model supplied one
    pub line: Option<u32>,
    /// Suggestion category (security | performance | style | bug)
    pub category: String,
    /// Suggestion message
    pub message: String,
    /// When the record was written
    pub created_at: DateTime<Utc>,
}

/// Append-only feedback record store.
///
/// Guarantees:
/// - `append` never mutates existing records.
/// - Listings are ordered newest first.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Append one feedback record.
    async fn append(&self, record: FeedbackRecord) -> StoreResult<()>;

    /// List the most recent records, newest first, up to `limit`.
    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<FeedbackRecord>>;

    /// List all records for one merge request, newest first.
    async fn list_for_change_request(
        &self,
        project_id: &str,
        merge_request_iid: &str,
    ) -> StoreResult<Vec<FeedbackRecord>>;

    /// List every record in the store.
    async fn list_all(&self) -> StoreResult<Vec<FeedbackRecord>>;
}

/// Hands out scoped store connections.
///
/// The pipeline acquires a fresh connection per reviewed file and drops it
/// when the file's records are written, so a flaky store never holds
/// resources across the whole run.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    /// Open one store connection. The connection is released by dropping
    /// the returned handle.
    async fn connect(&self) -> StoreResult<Box<dyn FeedbackStore>>;
}
