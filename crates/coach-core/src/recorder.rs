//! Metrics recording
//!
//! Persists one feedback record per suggestion, tagged with the active
//! project and merge request identity. Persistence is strictly
//! best-effort: publishing already happened by the time the recorder
//! runs, and nothing here may take the run down. A missing store
//! configuration is an explicit, logged no-op.

use std::sync::Arc;

use chrono::Utc;
use coach_state::{FeedbackRecord, StoreProvider};
use tracing::{debug, info, warn};

use crate::analyzer::Suggestion;
use crate::config::CoachConfig;

/// What happened to one file's records. Callers pattern-match; the
/// recorder itself never raises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// All records for the file were written.
    Recorded(usize),
    /// No store is configured; nothing was attempted.
    SkippedNoStore,
    /// Connecting or inserting failed; some records may be missing.
    Degraded(String),
}

/// Records suggestions into the metrics store.
pub struct MetricsRecorder {
    store: Option<Arc<dyn StoreProvider>>,
    project_id: String,
    merge_request_iid: String,
}

impl MetricsRecorder {
    pub fn new(store: Option<Arc<dyn StoreProvider>>, config: &CoachConfig) -> Self {
        MetricsRecorder {
            store,
            project_id: config.project_id.clone(),
            merge_request_iid: config.merge_request_iid.clone(),
        }
    }

    /// Persist one record per suggestion for `file_path`.
    ///
    /// A fresh store connection is acquired for this call and released on
    /// every exit path (it is dropped with the scope). Failures are
    /// logged and reported as [`RecordOutcome::Degraded`].
    pub async fn record(&self, file_path: &str, suggestions: &[Suggestion]) -> RecordOutcome {
        let Some(provider) = &self.store else {
            info!("No metrics store configured, skipping persistence");
            return RecordOutcome::SkippedNoStore;
        };

        let store = match provider.connect().await {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "Metrics store unavailable, skipping persistence");
                return RecordOutcome::Degraded(e.to_string());
            }
        };

        let mut written = 0usize;
        for suggestion in suggestions {
            let record = FeedbackRecord {
                project_id: self.project_id.clone(),
                merge_request_iid: self.merge_request_iid.clone(),
                file_path: file_path.to_string(),
                line: suggestion.line,
                category: suggestion.category.as_str().to_string(),
                message: suggestion.message.clone(),
                created_at: Utc::now(),
            };

            if let Err(e) = store.append(record).await {
                warn!(
                    file = %file_path,
                    written,
                    error = %e,
                    "Failed to persist suggestion"
                );
                return RecordOutcome::Degraded(e.to_string());
            }
            written += 1;
        }

        debug!(file = %file_path, written, "Persisted suggestions");
        RecordOutcome::Recorded(written)
    }
}
