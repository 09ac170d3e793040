//! Hosting-platform capability
//!
//! The pipeline consumes the platform through the [`ChangeHost`] trait:
//! read the change list for a merge request, write discussion comments.
//! [`GitLabHost`] is the production implementation against the GitLab
//! REST v4 API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::changes::ChangeEntry;
use crate::config::RevisionRefs;
use crate::error::CoachError;
use crate::Result;

/// Position of an inline comment within a merge request diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentPosition {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
    pub position_type: String,
    pub new_path: String,
    pub new_line: u32,
}

impl CommentPosition {
    /// Build a text position from the run's revision refs and a target
    /// file and line.
    pub fn text(revisions: &RevisionRefs, file_path: &str, line: u32) -> Self {
        CommentPosition {
            base_sha: revisions.base_sha.clone(),
            start_sha: revisions.start_sha.clone(),
            head_sha: revisions.head_sha.clone(),
            position_type: "text".to_string(),
            new_path: file_path.to_string(),
            new_line: line,
        }
    }
}

/// Hosting-platform operations the pipeline depends on.
#[async_trait]
pub trait ChangeHost: Send + Sync {
    /// Fetch the raw change list for one merge request.
    async fn fetch_changes(
        &self,
        project_id: &str,
        merge_request_iid: &str,
    ) -> Result<Vec<ChangeEntry>>;

    /// Create a discussion on the merge request. With a `position` the
    /// comment is anchored inline in the diff; without one it is a
    /// general comment.
    async fn create_discussion(
        &self,
        project_id: &str,
        merge_request_iid: &str,
        body: &str,
        position: Option<CommentPosition>,
    ) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ChangesResponse {
    changes: Vec<ChangeEntry>,
}

#[derive(Debug, Serialize)]
struct DiscussionRequest<'a> {
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<CommentPosition>,
}

/// GitLab REST v4 client.
pub struct GitLabHost {
    api_base: String,
    client: reqwest::Client,
}

impl GitLabHost {
    /// Create a client for the GitLab instance at `server_url`,
    /// authenticating every request with `token` as a bearer token.
    pub fn new(server_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| CoachError::Config(format!("invalid GitLab token: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .user_agent(concat!("mr-coach/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| CoachError::Config(e.to_string()))?;

        Ok(GitLabHost {
            api_base: format!("{}/api/v4", server_url.trim_end_matches('/')),
            client,
        })
    }
}

#[async_trait]
impl ChangeHost for GitLabHost {
    async fn fetch_changes(
        &self,
        project_id: &str,
        merge_request_iid: &str,
    ) -> Result<Vec<ChangeEntry>> {
        let url = format!(
            "{}/projects/{}/merge_requests/{}/changes",
            self.api_base, project_id, merge_request_iid
        );
        debug!(url = %url, "GET merge request changes");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoachError::Platform(e.to_string()))?
            .error_for_status()
            .map_err(|e| CoachError::Platform(e.to_string()))?;

        let body: ChangesResponse = response
            .json()
            .await
            .map_err(|e| CoachError::Platform(e.to_string()))?;

        Ok(body.changes)
    }

    async fn create_discussion(
        &self,
        project_id: &str,
        merge_request_iid: &str,
        body: &str,
        position: Option<CommentPosition>,
    ) -> Result<()> {
        let url = format!(
            "{}/projects/{}/merge_requests/{}/discussions",
            self.api_base, project_id, merge_request_iid
        );
        debug!(url = %url, inline = position.is_some(), "POST discussion");

        let request = DiscussionRequest { body, position };

        self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoachError::Platform(e.to_string()))?
            .error_for_status()
            .map_err(|e| CoachError::Platform(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_carries_revisions_and_target() {
        let revisions = RevisionRefs {
            base_sha: "base".to_string(),
            start_sha: "start".to_string(),
            head_sha: "head".to_string(),
        };

        let position = CommentPosition::text(&revisions, "src/main.rs", 10);
        assert_eq!(position.base_sha, "base");
        assert_eq!(position.start_sha, "start");
        assert_eq!(position.head_sha, "head");
        assert_eq!(position.position_type, "text");
        assert_eq!(position.new_path, "src/main.rs");
        assert_eq!(position.new_line, 10);
    }

    #[test]
    fn discussion_request_omits_absent_position() {
        let request = DiscussionRequest {
            body: "hello",
            position: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"body": "hello"}));
    }

    #[test]
    fn discussion_request_serializes_position() {
        let revisions = RevisionRefs {
            base_sha: "b".to_string(),
            start_sha: "s".to_string(),
            head_sha: "h".to_string(),
        };
        let request = DiscussionRequest {
            body: "hello",
            position: Some(CommentPosition::text(&revisions, "a.rs", 3)),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["position"]["position_type"], "text");
        assert_eq!(json["position"]["new_path"], "a.rs");
        assert_eq!(json["position"]["new_line"], 3);
    }
}
