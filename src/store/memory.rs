use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::{
    entities::{ScoreRecord, User},
    score_store::{ScoreStore, StoreError},
};

/// In-memory [ScoreStore] with the same observable behavior as the remote one. Backs the sync
/// layer tests and offline experimentation without a running document store.
#[derive(Default)]
pub struct MemoryScoreStore {
    partitions: Mutex<HashMap<User, BTreeMap<NaiveDate, ScoreRecord>>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn put_score(&self, user: User, record: ScoreRecord) -> Result<(), StoreError> {
        self.partitions
            .lock()
            .await
            .entry(user)
            .or_default()
            .insert(record.date, record);
        Ok(())
    }

    async fn get_score(
        &self,
        user: User,
        date: NaiveDate,
    ) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(self
            .partitions
            .lock()
            .await
            .get(&user)
            .and_then(|partition| partition.get(&date))
            .copied())
    }

    async fn list_scores(&self, user: User) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(self
            .partitions
            .lock()
            .await
            .get(&user)
            .map(|partition| partition.values().copied().collect())
            .unwrap_or_default())
    }
}
