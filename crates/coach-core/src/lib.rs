//! Coach Core - MR Coach review pipeline
//!
//! Single-pass batch pipeline that reviews one merge request per
//! invocation: fetch the changed files, ask a generative-text model for
//! critique per file, publish the critique back as merge request comments,
//! and persist a record of every suggestion.
//!
//! ## Components
//!
//! - `changes`: change-set fetching and the modified-files filter
//! - `analyzer`: model prompt, defensive JSON extraction, suggestions
//! - `publisher`: inline comments with general-comment fallback
//! - `recorder`: best-effort metrics persistence via coach-state
//! - `orchestrator`: the `Coach` run loop tying the stages together
//!
//! Only a change-set fetch failure is fatal; every other failure class is
//! contained where it occurs and degrades to a logged, best-effort outcome.

pub mod analyzer;
pub mod changes;
pub mod config;
mod error;
pub mod model;
pub mod orchestrator;
pub mod platform;
pub mod publisher;
pub mod recorder;
mod telemetry;

pub use analyzer::{ReviewAnalyzer, Suggestion, SuggestionCategory};
pub use changes::{ChangeEntry, ChangeFetcher};
pub use config::{CoachConfig, RatePolicy, RevisionRefs};
pub use error::CoachError;
pub use model::{GeminiModel, TextModel};
pub use orchestrator::{Coach, RunReport};
pub use platform::{ChangeHost, CommentPosition, GitLabHost};
pub use publisher::{FeedbackPublisher, PublishOutcome};
pub use recorder::{MetricsRecorder, RecordOutcome};
pub use telemetry::init_tracing;

/// Result type for coach-core operations
pub type Result<T> = std::result::Result<T, CoachError>;
