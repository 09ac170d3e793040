//! SurrealDB schema migrations and initialization
//!
//! This module provides initialization functions to set up the feedback
//! table with proper constraints and indexes.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::Result;

/// Initialize all MR Coach tables in SurrealDB
///
/// This should be called once on first connection to set up the schema.
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing MR Coach SurrealDB schema");

    init_feedback_table(db).await?;

    info!("MR Coach schema initialization complete");
    Ok(())
}

/// Initialize `feedback` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE feedback {
///   project_id:         STRING (indexed)
///   merge_request_iid:  STRING (indexed)
///   file_path:          STRING
///   line:               INT? (optional)
///   category:           STRING (indexed)
///   message:            STRING
///   created_at:         DATETIME (indexed)
/// }
/// ```
///
/// Constraints:
/// - Records are append-only: updates and deletes are denied at the table
///   level; the pipeline only ever creates rows and the dashboard only reads.
async fn init_feedback_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing feedback table");

    let sql = r#"
        DEFINE TABLE feedback AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update NONE
                FOR delete NONE;

        -- Index project_id for per-project filtering
        DEFINE INDEX idx_project_id ON TABLE feedback COLUMNS project_id;

        -- Composite index (project_id, merge_request_iid) for the per-MR listing
        DEFINE INDEX idx_project_mr ON TABLE feedback COLUMNS project_id, merge_request_iid;

        -- Index category for grouped dashboard counts
        DEFINE INDEX idx_category ON TABLE feedback COLUMNS category;

        -- Index created_at for recency ordering and time-window queries
        DEFINE INDEX idx_created_at ON TABLE feedback COLUMNS created_at DESC;
    "#;

    db.query(sql).await?;
    info!("✓ feedback table initialized");
    Ok(())
}
