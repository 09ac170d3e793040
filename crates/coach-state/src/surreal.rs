//! SurrealDB-backed FeedbackStore implementation
//!
//! Uses `schema::FeedbackRow` for persistence, converting to/from
//! `store::FeedbackRecord` at the boundary.

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::migrations;
use crate::schema::FeedbackRow;
use crate::store::{FeedbackRecord, FeedbackStore, StoreProvider, StoreResult};

/// Namespace and database selected on every connection.
const NAMESPACE: &str = "mrcoach";
const DATABASE: &str = "main";

/// SurrealDB-backed implementation of [`FeedbackStore`].
pub struct SurrealFeedbackStore {
    db: Surreal<Any>,
}

impl SurrealFeedbackStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `mrcoach/main`, and runs `init_schema`.
    pub async fn in_memory() -> crate::Result<Self> {
        Self::connect("mem://").await
    }

    /// Connect to the store at `url` (any engine URL SurrealDB accepts,
    /// e.g. `ws://...`, `surrealkv://path`, `mem://`).
    pub async fn connect(url: &str) -> crate::Result<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!("SurrealFeedbackStore connected ({})", url);
        Ok(Self { db })
    }

    fn take_rows(mut response: surrealdb::Response) -> StoreResult<Vec<FeedbackRecord>> {
        let rows: Vec<FeedbackRow> = response
            .take(0)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(rows.into_iter().map(FeedbackRecord::from).collect())
    }
}

#[async_trait]
impl FeedbackStore for SurrealFeedbackStore {
    async fn append(&self, record: FeedbackRecord) -> StoreResult<()> {
        let row = FeedbackRow::from(record);

        debug!(
            project_id = %row.project_id,
            merge_request_iid = %row.merge_request_iid,
            file_path = %row.file_path,
            "appending feedback record"
        );

        let _created: Option<FeedbackRow> = self
            .db
            .create("feedback")
            .content(row)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<FeedbackRecord>> {
        let response = self
            .db
            .query("SELECT * FROM feedback ORDER BY created_at DESC LIMIT $limit")
            .bind(("limit", limit as i64))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Self::take_rows(response)
    }

    async fn list_for_change_request(
        &self,
        project_id: &str,
        merge_request_iid: &str,
    ) -> StoreResult<Vec<FeedbackRecord>> {
        let pid = project_id.to_string();
        let iid = merge_request_iid.to_string();

        let response = self
            .db
            .query(
                "SELECT * FROM feedback \
                 WHERE project_id = $pid AND merge_request_iid = $iid \
                 ORDER BY created_at DESC",
            )
            .bind(("pid", pid))
            .bind(("iid", iid))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Self::take_rows(response)
    }

    async fn list_all(&self) -> StoreResult<Vec<FeedbackRecord>> {
        let response = self
            .db
            .query("SELECT * FROM feedback ORDER BY created_at DESC")
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Self::take_rows(response)
    }
}

/// [`StoreProvider`] that opens a fresh SurrealDB connection per call.
///
/// The review pipeline uses this so each reviewed file gets a scoped
/// connection that is released as soon as its records are written.
#[derive(Debug, Clone)]
pub struct SurrealStoreProvider {
    url: String,
}

impl SurrealStoreProvider {
    /// Create a provider for the store at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl StoreProvider for SurrealStoreProvider {
    async fn connect(&self) -> StoreResult<Box<dyn FeedbackStore>> {
        let store = SurrealFeedbackStore::connect(&self.url).await?;
        Ok(Box::new(store))
    }
}
