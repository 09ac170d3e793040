//! Feedback publishing
//!
//! Converts suggestions into merge request comments. Inline placement is
//! preferred; when the platform rejects it (a line outside the diff
//! context is the common case) the body is re-posted as a general comment
//! prefixed with the file and line, so feedback is never silently lost.
//! Posting is not idempotent: repeating a run creates duplicate comments.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::analyzer::Suggestion;
use crate::config::{CoachConfig, RevisionRefs};
use crate::platform::{ChangeHost, CommentPosition};

/// What happened to one comment. Callers pattern-match instead of relying
/// on the absence of an error; the publisher itself never raises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Placed inline at the requested file and line.
    Inline,
    /// Inline placement failed; posted as a general comment carrying the
    /// file and line as text.
    Fallback,
    /// Posted as a general comment (no anchor requested).
    General,
    /// Every attempt failed; the comment was dropped.
    Dropped(String),
}

/// Posts review feedback to the merge request.
pub struct FeedbackPublisher {
    host: Arc<dyn ChangeHost>,
    project_id: String,
    merge_request_iid: String,
    revisions: RevisionRefs,
}

impl FeedbackPublisher {
    pub fn new(host: Arc<dyn ChangeHost>, config: &CoachConfig) -> Self {
        FeedbackPublisher {
            host,
            project_id: config.project_id.clone(),
            merge_request_iid: config.merge_request_iid.clone(),
            revisions: config.revisions.clone(),
        }
    }

    /// Post `body`, inline at `anchor` when one is given.
    ///
    /// With an anchor: attempt inline placement first; on rejection fall
    /// back to a general comment prefixed with the anchor as plain text.
    /// Without an anchor: post a general comment directly.
    pub async fn post(&self, body: &str, anchor: Option<(&str, u32)>) -> PublishOutcome {
        match anchor {
            Some((file_path, line)) => {
                let position = CommentPosition::text(&self.revisions, file_path, line);
                match self.create(body, Some(position)).await {
                    Ok(()) => {
                        debug!(file = %file_path, line, "Posted inline comment");
                        PublishOutcome::Inline
                    }
                    Err(e) => {
                        warn!(
                            file = %file_path,
                            line,
                            error = %e,
                            "Inline comment rejected, falling back to general comment"
                        );
                        let fallback = fallback_comment(file_path, line, body);
                        match self.create(&fallback, None).await {
                            Ok(()) => PublishOutcome::Fallback,
                            Err(e) => {
                                error!(error = %e, "Fallback comment failed, dropping feedback");
                                PublishOutcome::Dropped(e.to_string())
                            }
                        }
                    }
                }
            }
            None => match self.create(body, None).await {
                Ok(()) => {
                    debug!("Posted general comment");
                    PublishOutcome::General
                }
                Err(e) => {
                    error!(error = %e, "General comment failed, dropping feedback");
                    PublishOutcome::Dropped(e.to_string())
                }
            },
        }
    }

    async fn create(
        &self,
        body: &str,
        position: Option<CommentPosition>,
    ) -> crate::Result<()> {
        self.host
            .create_discussion(&self.project_id, &self.merge_request_iid, body, position)
            .await
    }
}

/// Comment body for one suggestion.
pub fn suggestion_comment(suggestion: &Suggestion) -> String {
    format!(
        "🔍 **{}**: {}\n\n💡 **Suggestion**: {}",
        suggestion.category.as_str().to_uppercase(),
        suggestion.message,
        suggestion.remediation
    )
}

/// General-comment body used when inline placement was rejected.
fn fallback_comment(file_path: &str, line: u32, body: &str) -> String {
    format!("**{file_path}:{line}**\n\n{body}")
}
