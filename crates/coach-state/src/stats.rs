//! Dashboard aggregates over persisted feedback records.
//!
//! Pure functions: the dashboard daemon fetches records through
//! [`crate::FeedbackStore`] and aggregates them here, so every number it
//! serves is derivable from the `FeedbackRecord` schema alone and the
//! logic is testable without a database.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::FeedbackRecord;

/// Suggestion count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Per-day activity inside the trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    /// Day in `YYYY-MM-DD` form (UTC).
    pub date: String,
    /// Suggestions recorded that day.
    pub suggestions: u64,
    /// Distinct merge requests that received feedback that day.
    pub merge_requests: u64,
}

/// Aggregate statistics served by `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_suggestions: u64,
    pub total_merge_requests: u64,
    pub total_projects: u64,
    /// Per-category counts, largest first.
    pub suggestions_by_category: Vec<CategoryCount>,
    /// Per-day counts for records at or after the window start, oldest first.
    pub daily_activity: Vec<DailyActivity>,
}

/// Compute dashboard statistics over `records`.
///
/// Totals and category counts cover every record; `daily_activity` only
/// covers records with `created_at >= window_start` (the caller passes
/// "now minus 30 days" for the dashboard's trailing window).
pub fn dashboard_stats(records: &[FeedbackRecord], window_start: DateTime<Utc>) -> DashboardStats {
    let total_suggestions = records.len() as u64;

    let merge_requests: HashSet<&str> = records
        .iter()
        .map(|r| r.merge_request_iid.as_str())
        .collect();
    let projects: HashSet<&str> = records.iter().map(|r| r.project_id.as_str()).collect();

    let mut by_category: HashMap<&str, u64> = HashMap::new();
    for record in records {
        *by_category.entry(record.category.as_str()).or_insert(0) += 1;
    }
    let mut suggestions_by_category: Vec<CategoryCount> = by_category
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    suggestions_by_category.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });

    // BTreeMap keys are YYYY-MM-DD strings, so iteration order is date order.
    let mut daily: BTreeMap<String, (u64, HashSet<&str>)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.created_at >= window_start) {
        let day = record.created_at.format("%Y-%m-%d").to_string();
        let entry = daily.entry(day).or_default();
        entry.0 += 1;
        entry.1.insert(record.merge_request_iid.as_str());
    }
    let daily_activity = daily
        .into_iter()
        .map(|(date, (suggestions, mrs))| DailyActivity {
            date,
            suggestions,
            merge_requests: mrs.len() as u64,
        })
        .collect();

    DashboardStats {
        total_suggestions,
        total_merge_requests: merge_requests.len() as u64,
        total_projects: projects.len() as u64,
        suggestions_by_category,
        daily_activity,
    }
}
