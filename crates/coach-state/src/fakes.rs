//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryFeedbackStore` and `MemoryStoreProvider` that satisfy
//! the trait contracts without any external dependencies.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::store::{FeedbackRecord, FeedbackStore, StoreProvider, StoreResult};

/// In-memory feedback store backed by a shared `Vec<FeedbackRecord>`.
///
/// Cloning yields a handle onto the same backing storage, so a
/// [`MemoryStoreProvider`] can hand out per-file "connections" that all
/// observe the same records.
#[derive(Debug, Default, Clone)]
pub struct MemoryFeedbackStore {
    records: Arc<Mutex<Vec<FeedbackRecord>>>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn append(&self, record: FeedbackRecord) -> StoreResult<()> {
        let mut records = self.records.lock().unwrap();
        records.push(record);
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<FeedbackRecord>> {
        let records = self.records.lock().unwrap();
        let mut all = records.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        Ok(all)
    }

    async fn list_for_change_request(
        &self,
        project_id: &str,
        merge_request_iid: &str,
    ) -> StoreResult<Vec<FeedbackRecord>> {
        let records = self.records.lock().unwrap();
        let mut matched: Vec<FeedbackRecord> = records
            .iter()
            .filter(|r| r.project_id == project_id && r.merge_request_iid == merge_request_iid)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn list_all(&self) -> StoreResult<Vec<FeedbackRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.clone())
    }
}

/// [`StoreProvider`] over a shared [`MemoryFeedbackStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreProvider {
    store: MemoryFeedbackStore,
}

impl MemoryStoreProvider {
    /// Wrap an existing store so tests can inspect what the pipeline wrote.
    pub fn new(store: MemoryFeedbackStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StoreProvider for MemoryStoreProvider {
    async fn connect(&self) -> StoreResult<Box<dyn FeedbackStore>> {
        Ok(Box::new(self.store.clone()))
    }
}
