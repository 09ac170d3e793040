//! Pipeline configuration
//!
//! Everything is read once from the CI environment at startup and passed
//! into component constructors; no component performs ambient environment
//! lookups of its own.

use std::time::Duration;

/// The three revision references GitLab needs to anchor an inline comment
/// to a position in the merge request diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionRefs {
    /// Target branch HEAD (`base_sha`)
    pub base_sha: String,
    /// Source branch HEAD (`start_sha`)
    pub start_sha: String,
    /// Commit under review (`head_sha`)
    pub head_sha: String,
}

/// Configuration for one review run.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// GitLab server base URL (without `/api/v4`)
    pub server_url: String,
    /// GitLab API token
    pub gitlab_token: String,
    /// Google Generative Language API key
    pub model_api_key: String,
    /// Metrics store connection string; `None` disables persistence
    pub store_url: Option<String>,
    /// Project the merge request belongs to
    pub project_id: String,
    /// Merge request internal ID
    pub merge_request_iid: String,
    /// Revision refs for inline comment positioning
    pub revisions: RevisionRefs,
}

impl CoachConfig {
    /// Create a configuration from CI environment variables.
    ///
    /// Reads:
    /// - CI_SERVER_URL (optional, default: "https://gitlab.com")
    /// - GITLAB_TOKEN
    /// - GOOGLE_AI_API_KEY
    /// - SURREALDB_URL (optional; absent disables metrics persistence)
    /// - CI_PROJECT_ID
    /// - CI_MERGE_REQUEST_IID
    /// - CI_MERGE_REQUEST_TARGET_BRANCH_SHA (base)
    /// - CI_MERGE_REQUEST_SOURCE_BRANCH_SHA (start)
    /// - CI_COMMIT_SHA (head)
    ///
    /// Values the CI runner is expected to provide are not validated here;
    /// a missing token or identifier surfaces as the first dependent
    /// platform call failing, which takes the run down the fatal path.
    pub fn from_env() -> Self {
        CoachConfig {
            server_url: std::env::var("CI_SERVER_URL")
                .unwrap_or_else(|_| "https://gitlab.com".to_string()),
            gitlab_token: std::env::var("GITLAB_TOKEN").unwrap_or_default(),
            model_api_key: std::env::var("GOOGLE_AI_API_KEY").unwrap_or_default(),
            store_url: std::env::var("SURREALDB_URL").ok(),
            project_id: std::env::var("CI_PROJECT_ID").unwrap_or_default(),
            merge_request_iid: std::env::var("CI_MERGE_REQUEST_IID").unwrap_or_default(),
            revisions: RevisionRefs {
                base_sha: std::env::var("CI_MERGE_REQUEST_TARGET_BRANCH_SHA")
                    .unwrap_or_default(),
                start_sha: std::env::var("CI_MERGE_REQUEST_SOURCE_BRANCH_SHA")
                    .unwrap_or_default(),
                head_sha: std::env::var("CI_COMMIT_SHA").unwrap_or_default(),
            },
        }
    }
}

/// Rate-shaping policy for the orchestrator.
///
/// Both the hosting platform and the model endpoint enforce request
/// quotas, so the pipeline caps how many files one run reviews and pauses
/// between files. Injected rather than hard-coded so tests can drive the
/// run loop without wall-clock waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatePolicy {
    /// Maximum changed files reviewed per run; files beyond the cap are
    /// skipped.
    pub max_files: usize,
    /// Pause after each reviewed file.
    pub file_delay: Duration,
}

impl Default for RatePolicy {
    fn default() -> Self {
        RatePolicy {
            max_files: 5,
            file_delay: Duration::from_secs(1),
        }
    }
}
