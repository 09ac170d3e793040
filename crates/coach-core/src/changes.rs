//! Change-set fetching and filtering
//!
//! The fetcher retrieves the full change list for one merge request and
//! keeps only in-place modifications: pure additions and pure deletions
//! have no before/after context worth reviewing, and entries without diff
//! content carry nothing to analyze.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::platform::ChangeHost;
use crate::Result;

/// One changed file in a merge request, as reported by the platform.
///
/// Immutable once fetched; discarded after the pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Path of the file on the source branch
    #[serde(rename = "new_path")]
    pub file_path: String,

    /// Unified diff text for this file
    #[serde(rename = "diff", default)]
    pub diff_text: String,

    /// Whether the file was newly added
    #[serde(rename = "new_file", default)]
    pub is_addition: bool,

    /// Whether the file was deleted
    #[serde(rename = "deleted_file", default)]
    pub is_deletion: bool,
}

/// Keep only entries that have diff content and are in-place modifications,
/// preserving platform order.
pub fn modified_only(changes: Vec<ChangeEntry>) -> Vec<ChangeEntry> {
    changes
        .into_iter()
        .filter(|c| !c.diff_text.is_empty() && !c.is_addition && !c.is_deletion)
        .collect()
}

/// Fetches the reviewable change set for a merge request.
pub struct ChangeFetcher {
    host: Arc<dyn ChangeHost>,
}

impl ChangeFetcher {
    pub fn new(host: Arc<dyn ChangeHost>) -> Self {
        Self { host }
    }

    /// Fetch the change list and filter it down to modified files.
    ///
    /// Both identifiers are trusted to be non-empty (they come from CI
    /// configuration); no further validation is applied. Any transport or
    /// authorization failure propagates: without a change set there is
    /// nothing to review, so this is the one fatal failure class.
    pub async fn fetch_modified(
        &self,
        project_id: &str,
        merge_request_iid: &str,
    ) -> Result<Vec<ChangeEntry>> {
        info!("Fetching merge request changes");

        let raw = self.host.fetch_changes(project_id, merge_request_iid).await?;
        let kept = modified_only(raw);

        info!(modified = kept.len(), "Found modified files");
        Ok(kept)
    }
}
