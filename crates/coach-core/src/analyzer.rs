//! Review analysis via the text-generation capability
//!
//! One file's diff goes in, a bounded list of structured suggestions comes
//! out. The model is treated as untrusted free text: its reply may wrap
//! the requested JSON in prose, truncate it, or be garbage. The analyzer
//! extracts the first balanced-brace span and decodes only that; any
//! failure along the way degrades to an empty suggestion list and a log
//! line, never to an error the orchestrator has to handle.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::TextModel;

/// Category of a review suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Security,
    Performance,
    Style,
    Bug,
}

impl SuggestionCategory {
    /// The category name as it appears on the wire and in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionCategory::Security => "security",
            SuggestionCategory::Performance => "performance",
            SuggestionCategory::Style => "style",
            SuggestionCategory::Bug => "bug",
        }
    }
}

impl fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One piece of structured review feedback for a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Line the issue anchors to, when the model supplied one
    #[serde(default)]
    pub line: Option<u32>,

    /// Issue category
    #[serde(rename = "type")]
    pub category: SuggestionCategory,

    /// Brief description of the issue
    pub message: String,

    /// How to fix it
    #[serde(rename = "suggestion", default)]
    pub remediation: String,
}

/// The JSON document the prompt asks the model to produce.
#[derive(Debug, Deserialize)]
struct ModelReview {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

/// Analyzes one file diff at a time by delegating to a [`TextModel`].
pub struct ReviewAnalyzer {
    model: Arc<dyn TextModel>,
}

impl ReviewAnalyzer {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Produce suggestions for one file's diff.
    ///
    /// Never fails the caller: a model call failure, a reply without a
    /// JSON object, or an undecodable object all degrade to an empty
    /// list. One attempt per file; rate shaping is the orchestrator's
    /// concern.
    pub async fn analyze(&self, file_path: &str, diff_text: &str) -> Vec<Suggestion> {
        info!(file = %file_path, "Analyzing diff");

        let prompt = review_prompt(file_path, diff_text);
        let reply = match self.model.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %file_path, error = %e, "Model call failed, skipping file");
                return Vec::new();
            }
        };

        let Some(span) = first_json_object(&reply) else {
            warn!(file = %file_path, "No JSON object in model reply, skipping file");
            return Vec::new();
        };

        match serde_json::from_str::<ModelReview>(span) {
            Ok(review) => {
                debug!(
                    file = %file_path,
                    suggestions = review.suggestions.len(),
                    "Model reply decoded"
                );
                review.suggestions
            }
            Err(e) => {
                warn!(file = %file_path, error = %e, "Undecodable model reply, skipping file");
                Vec::new()
            }
        }
    }
}

/// The fixed review instruction sent to the model for each file.
fn review_prompt(file_path: &str, diff_text: &str) -> String {
    format!(
        r#"You are a code review expert. Analyze this code diff and provide concise, actionable feedback.
Focus on:
- Security vulnerabilities
- Performance issues
- Code style and best practices
- Potential bugs

File: {file_path}
Diff:
{diff_text}

Provide feedback in this JSON format:
{{
  "suggestions": [
    {{
      "line": 10,
      "type": "security|performance|style|bug",
      "message": "Brief description of the issue",
      "suggestion": "How to fix it"
    }}
  ]
}}

Only include serious issues. If the code looks good, return {{"suggestions": []}}."#
    )
}

/// Locate the first balanced-brace span in `text`.
///
/// The scan is string-aware: braces inside JSON string literals (and
/// escaped quotes inside those) do not affect the depth count. Returns
/// `None` when no opening brace exists or the span never closes.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::error::CoachError;

    /// Model fake that replays a fixed reply, or fails.
    struct CannedModel {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextModel for CannedModel {
        async fn generate(&self, prompt: &str) -> crate::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(CoachError::Model("quota exceeded".to_string())),
            }
        }
    }

    // -- first_json_object ---------------------------------------------------

    #[test]
    fn extracts_object_wrapped_in_prose() {
        let text = "Sure! Here is my review:\n{\"suggestions\": []}\nHope that helps.";
        assert_eq!(first_json_object(text), Some("{\"suggestions\": []}"));
    }

    #[test]
    fn extracts_nested_objects() {
        let text = r#"{"a": {"b": {"c": 1}}} trailing"#;
        assert_eq!(first_json_object(text), Some(r#"{"a": {"b": {"c": 1}}}"#));
    }

    #[test]
    fn braces_inside_strings_do_not_close_the_span() {
        let text = r#"{"message": "use {} instead of format!"}"#;
        assert_eq!(first_json_object(text), Some(text));
    }

    #[test]
    fn escaped_quotes_inside_strings_are_handled() {
        let text = r#"{"message": "say \"hi\" {here}"}"#;
        assert_eq!(first_json_object(text), Some(text));
    }

    #[test]
    fn no_brace_yields_none() {
        assert_eq!(first_json_object("all good, nothing to report"), None);
    }

    #[test]
    fn unterminated_object_yields_none() {
        assert_eq!(first_json_object(r#"{"suggestions": ["#), None);
    }

    // -- analyze -------------------------------------------------------------

    #[tokio::test]
    async fn analyze_decodes_prose_wrapped_reply() {
        let reply = r#"Here you go:
{"suggestions": [{"line": 10, "type": "security", "message": "SQL injection", "suggestion": "bind parameters"}]}"#;
        let analyzer = ReviewAnalyzer::new(Arc::new(CannedModel::replying(reply)));

        let suggestions = analyzer.analyze("src/db.rs", "@@ -1 +1 @@").await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].line, Some(10));
        assert_eq!(suggestions[0].category, SuggestionCategory::Security);
        assert_eq!(suggestions[0].message, "SQL injection");
        assert_eq!(suggestions[0].remediation, "bind parameters");
    }

    #[tokio::test]
    async fn analyze_returns_empty_for_clean_report() {
        let analyzer =
            ReviewAnalyzer::new(Arc::new(CannedModel::replying(r#"{"suggestions": []}"#)));
        let suggestions = analyzer.analyze("src/ok.rs", "@@").await;
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn analyze_returns_empty_when_reply_has_no_json() {
        let analyzer = ReviewAnalyzer::new(Arc::new(CannedModel::replying(
            "I could not review this file.",
        )));
        let suggestions = analyzer.analyze("src/a.rs", "@@").await;
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn analyze_returns_empty_for_undecodable_json() {
        let analyzer = ReviewAnalyzer::new(Arc::new(CannedModel::replying(
            r#"{"suggestions": [{"type": "novel-category", "message": "??"}]}"#,
        )));
        let suggestions = analyzer.analyze("src/a.rs", "@@").await;
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn analyze_returns_empty_when_model_fails() {
        let analyzer = ReviewAnalyzer::new(Arc::new(CannedModel::failing()));
        let suggestions = analyzer.analyze("src/a.rs", "@@").await;
        assert!(suggestions.is_empty());
    }

    #[tokio::test]
    async fn prompt_embeds_file_path_and_diff() {
        let model = Arc::new(CannedModel::replying(r#"{"suggestions": []}"#));
        let analyzer = ReviewAnalyzer::new(model.clone());
        analyzer.analyze("src/special.rs", "@@ my diff @@").await;

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("File: src/special.rs"));
        assert!(prompts[0].contains("@@ my diff @@"));
        assert!(prompts[0].contains("security|performance|style|bug"));
    }

    #[test]
    fn suggestion_line_is_optional() {
        let json = r#"{"type": "style", "message": "long function", "suggestion": "split it"}"#;
        let suggestion: Suggestion = serde_json::from_str(json).unwrap();
        assert_eq!(suggestion.line, None);
    }
}
