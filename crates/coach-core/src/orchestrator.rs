//! Review run orchestration
//!
//! Single pass per invocation: fetch the change set, review a capped
//! subset of files sequentially with a fixed pause between them, publish
//! each suggestion, persist each file's suggestions, then post a summary.
//! Only a fetch failure escapes; it is caught exactly once here, reported
//! as one error comment, and handed to the caller for the non-zero exit.

use std::sync::Arc;

use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::analyzer::ReviewAnalyzer;
use crate::changes::ChangeFetcher;
use crate::config::{CoachConfig, RatePolicy};
use crate::model::TextModel;
use crate::platform::ChangeHost;
use crate::publisher::{suggestion_comment, FeedbackPublisher};
use crate::recorder::MetricsRecorder;
use crate::Result;

/// User-visible comment bodies posted by the orchestrator.
pub mod messages {
    /// Posted when the merge request has no reviewable modifications.
    pub const NO_CHANGES: &str = "🤖 **MR Coach**: No code changes detected to review.";

    /// Posted before the per-file loop starts.
    pub const RUN_STARTED: &str =
        "🤖 **MR Coach** is analyzing your changes... Please wait for feedback!";

    /// Posted once when the run takes the fatal path.
    pub const RUN_FAILED: &str =
        "🚨 **MR Coach Error**: Failed to analyze changes. Please check the pipeline logs.";

    /// End-of-run summary body.
    pub fn summary(total_suggestions: usize) -> String {
        if total_suggestions > 0 {
            format!(
                "🎉 **MR Coach Summary**: Found {total_suggestions} suggestions for improvement!"
            )
        } else {
            "✅ **MR Coach Summary**: Your code looks great! No issues found.".to_string()
        }
    }
}

/// What one run did. Ephemeral; feeds the summary comment and the final
/// log line, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Modified files in the change set after filtering.
    pub files_changed: usize,
    /// Files actually analyzed (capped by the rate policy).
    pub files_reviewed: usize,
    /// Files beyond the cap, skipped without review.
    pub files_skipped: usize,
    /// Suggestions published across all reviewed files.
    pub total_suggestions: usize,
}

/// The review pipeline orchestrator.
pub struct Coach {
    fetcher: ChangeFetcher,
    analyzer: ReviewAnalyzer,
    publisher: FeedbackPublisher,
    recorder: MetricsRecorder,
    policy: RatePolicy,
    project_id: String,
    merge_request_iid: String,
}

impl Coach {
    /// Wire the pipeline components for one merge request.
    pub fn new(
        config: &CoachConfig,
        host: Arc<dyn ChangeHost>,
        model: Arc<dyn TextModel>,
        store: Option<Arc<dyn coach_state::StoreProvider>>,
        policy: RatePolicy,
    ) -> Self {
        Coach {
            fetcher: ChangeFetcher::new(host.clone()),
            analyzer: ReviewAnalyzer::new(model),
            publisher: FeedbackPublisher::new(host, config),
            recorder: MetricsRecorder::new(store, config),
            policy,
            project_id: config.project_id.clone(),
            merge_request_iid: config.merge_request_iid.clone(),
        }
    }

    /// Execute one review run.
    ///
    /// The single top-level catch: any error out of the run body (only
    /// the change-set fetch can produce one) is reported as one
    /// best-effort error comment and returned, and the binary maps it to
    /// a non-zero exit. Contained failures inside the loop never reach
    /// this point.
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "coach.run",
            run_id = %run_id,
            project_id = %self.project_id,
            merge_request_iid = %self.merge_request_iid,
        );

        match self.run_inner().instrument(span).await {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(error = %e, "Review run failed");
                self.publisher.post(messages::RUN_FAILED, None).await;
                Err(e)
            }
        }
    }

    async fn run_inner(&self) -> Result<RunReport> {
        let changes = self
            .fetcher
            .fetch_modified(&self.project_id, &self.merge_request_iid)
            .await?;

        if changes.is_empty() {
            self.publisher.post(messages::NO_CHANGES, None).await;
            info!("No reviewable changes, run complete");
            return Ok(RunReport::default());
        }

        self.publisher.post(messages::RUN_STARTED, None).await;

        let files_reviewed = changes.len().min(self.policy.max_files);
        let files_skipped = changes.len() - files_reviewed;
        if files_skipped > 0 {
            info!(
                files_skipped,
                cap = self.policy.max_files,
                "File cap reached, remaining files skipped"
            );
        }

        let mut total_suggestions = 0usize;

        for change in changes.iter().take(self.policy.max_files) {
            let suggestions = self
                .analyzer
                .analyze(&change.file_path, &change.diff_text)
                .await;

            if !suggestions.is_empty() {
                total_suggestions += suggestions.len();

                for suggestion in &suggestions {
                    let body = suggestion_comment(suggestion);
                    let anchor = suggestion
                        .line
                        .map(|line| (change.file_path.as_str(), line));
                    self.publisher.post(&body, anchor).await;
                }

                self.recorder.record(&change.file_path, &suggestions).await;
            }

            // Pause between files so neither the platform nor the model
            // endpoint sees a burst.
            tokio::time::sleep(self.policy.file_delay).await;
        }

        self.publisher
            .post(&messages::summary(total_suggestions), None)
            .await;

        info!(
            files_reviewed,
            files_skipped, total_suggestions, "Review run complete"
        );

        Ok(RunReport {
            files_changed: changes.len(),
            files_reviewed,
            files_skipped,
            total_suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_suggestions() {
        assert_eq!(
            messages::summary(3),
            "🎉 **MR Coach Summary**: Found 3 suggestions for improvement!"
        );
    }

    #[test]
    fn summary_reports_all_clear_for_zero() {
        assert!(messages::summary(0).contains("No issues found"));
    }
}
