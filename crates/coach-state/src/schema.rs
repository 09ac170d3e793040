//! Schema definitions for the MR Coach SurrealDB tables
//!
//! Tables:
//! - feedback: append-only review suggestion records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::FeedbackRecord;

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Database row for the `feedback` table.
///
/// Mirrors [`FeedbackRecord`] with the timestamp stored as a native
/// SurrealDB datetime so `ORDER BY created_at` and time-range filters work
/// on the database side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRow {
    pub project_id: String,
    pub merge_request_iid: String,
    pub file_path: String,
    pub line: Option<u32>,
    pub category: String,
    pub message: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackRecord> for FeedbackRow {
    fn from(record: FeedbackRecord) -> Self {
        FeedbackRow {
            project_id: record.project_id,
            merge_request_iid: record.merge_request_iid,
            file_path: record.file_path,
            line: record.line,
            category: record.category,
            message: record.message,
            created_at: record.created_at,
        }
    }
}

impl From<FeedbackRow> for FeedbackRecord {
    fn from(row: FeedbackRow) -> Self {
        FeedbackRecord {
            project_id: row.project_id,
            merge_request_iid: row.merge_request_iid,
            file_path: row.file_path,
            line: row.line,
            category: row.category,
            message: row.message,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn row_round_trips_record() {
        let record = FeedbackRecord {
            project_id: "42".to_string(),
            merge_request_iid: "7".to_string(),
            file_path: "src/main.rs".to_string(),
            line: Some(10),
            category: "security".to_string(),
            message: "hardcoded credential".to_string(),
            created_at: Utc::now(),
        };

        let row = FeedbackRow::from(record.clone());
        let back = FeedbackRecord::from(row);
        assert_eq!(back, record);
    }
}
