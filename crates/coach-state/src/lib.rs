//! Coach-State: SurrealDB Backend for MR Coach
//!
//! This crate provides the persistence layer for MR Coach review feedback.
//! It owns the append-only `feedback` table and everything that reads from
//! it, keeping the review pipeline itself free of database concerns.
//!
//! ## Key Components
//!
//! - `FeedbackStore`: storage trait for appending and listing feedback records
//! - `StoreProvider`: hands out one scoped store connection per call
//! - `SurrealFeedbackStore`: SurrealDB-backed implementation
//! - `stats`: pure aggregation functions backing the dashboard read API

mod error;
pub mod fakes;
mod migrations;
mod schema;
pub mod stats;
pub mod store;
mod surreal;

pub use error::StoreError;
pub use stats::{CategoryCount, DailyActivity, DashboardStats};
pub use store::{FeedbackRecord, FeedbackStore, StoreProvider, StoreResult};
pub use surreal::{SurrealFeedbackStore, SurrealStoreProvider};

/// Result type for coach-state operations
pub type Result<T> = std::result::Result<T, StoreError>;
