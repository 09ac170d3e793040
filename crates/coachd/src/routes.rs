//! Read-only REST routes over the feedback store.
//!
//! Endpoints:
//!   GET /api/health
//!   GET /api/stats
//!   GET /api/recent?limit=N
//!   GET /api/mr/{project_id}/{merge_request_iid}
//!
//! The dashboard never writes: every handler is a listing or an aggregate
//! over records the review pipeline appended.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use coach_state::stats::dashboard_stats;
use coach_state::{DashboardStats, FeedbackRecord, FeedbackStore, StoreError};

/// Shared state for all handlers.
pub struct AppContext {
    pub store: Arc<dyn FeedbackStore>,
}

/// Store failures surface as HTTP 500 with a JSON error body.
#[derive(Debug)]
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Store query failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/recent", get(recent))
        .route(
            "/api/mr/{project_id}/{merge_request_iid}",
            get(merge_request_feedback),
        )
        .with_state(ctx)
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn stats(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<DashboardStats>, ApiError> {
    let records = ctx.store.list_all().await?;
    let window_start = Utc::now() - Duration::days(30);
    Ok(Json(dashboard_stats(&records, window_start)))
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    limit: Option<usize>,
}

pub async fn recent(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<FeedbackRecord>>, ApiError> {
    let limit = params.limit.unwrap_or(10);
    Ok(Json(ctx.store.list_recent(limit).await?))
}

pub async fn merge_request_feedback(
    State(ctx): State<Arc<AppContext>>,
    Path((project_id, merge_request_iid)): Path<(String, String)>,
) -> Result<Json<Vec<FeedbackRecord>>, ApiError> {
    Ok(Json(
        ctx.store
            .list_for_change_request(&project_id, &merge_request_iid)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_state::fakes::MemoryFeedbackStore;

    fn record(project: &str, mr: &str, category: &str) -> FeedbackRecord {
        FeedbackRecord {
            project_id: project.to_string(),
            merge_request_iid: mr.to_string(),
            file_path: "src/lib.rs".to_string(),
            line: Some(4),
            category: category.to_string(),
            message: "msg".to_string(),
            created_at: Utc::now(),
        }
    }

    async fn context_with(records: Vec<FeedbackRecord>) -> Arc<AppContext> {
        let store = MemoryFeedbackStore::new();
        for r in records {
            store.append(r).await.unwrap();
        }
        Arc::new(AppContext {
            store: Arc::new(store),
        })
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn stats_aggregates_store_records() {
        let ctx = context_with(vec![
            record("1", "10", "bug"),
            record("1", "10", "bug"),
            record("2", "11", "style"),
        ])
        .await;

        let Json(stats) = stats(State(ctx)).await.unwrap();
        assert_eq!(stats.total_suggestions, 3);
        assert_eq!(stats.total_merge_requests, 2);
        assert_eq!(stats.total_projects, 2);
        assert_eq!(stats.suggestions_by_category[0].category, "bug");
        assert_eq!(stats.suggestions_by_category[0].count, 2);
    }

    #[tokio::test]
    async fn recent_defaults_to_ten_records() {
        let records = (0..15).map(|i| record("1", &i.to_string(), "bug")).collect();
        let ctx = context_with(records).await;

        let Json(listed) = recent(State(ctx), Query(RecentParams { limit: None }))
            .await
            .unwrap();
        assert_eq!(listed.len(), 10);
    }

    #[tokio::test]
    async fn recent_honors_limit_param() {
        let records = (0..5).map(|i| record("1", &i.to_string(), "bug")).collect();
        let ctx = context_with(records).await;

        let Json(listed) = recent(State(ctx), Query(RecentParams { limit: Some(2) }))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn merge_request_feedback_filters_by_identity() {
        let ctx = context_with(vec![
            record("1", "10", "bug"),
            record("1", "11", "bug"),
            record("2", "10", "style"),
        ])
        .await;

        let Json(listed) = merge_request_feedback(
            State(ctx),
            Path(("1".to_string(), "10".to_string())),
        )
        .await
        .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].project_id, "1");
        assert_eq!(listed[0].merge_request_iid, "10");
    }
}
