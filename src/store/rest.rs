use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::utils::time::date_key;

use super::{
    entities::{ScoreRecord, User},
    score_store::{ScoreStore, StoreError},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The production [ScoreStore]. Documents live at `{base}/{user}/{date}`, a partition is
/// enumerated at `{base}/{user}`. The store is a plain document service, there is no
/// authentication or pagination to deal with.
pub struct RestScoreStore {
    client: Client,
    base: String,
}

impl RestScoreStore {
    pub fn new(base: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Unavailable(e.into()))?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn document_url(&self, user: User, date: NaiveDate) -> String {
        format!("{}/{}/{}", self.base, user.as_str(), date_key(date))
    }

    fn partition_url(&self, user: User) -> String {
        format!("{}/{}", self.base, user.as_str())
    }
}

#[async_trait]
impl ScoreStore for RestScoreStore {
    async fn put_score(&self, user: User, record: ScoreRecord) -> Result<(), StoreError> {
        let url = self.document_url(user, record.date);
        debug!("Writing score document to {url}");
        let response = self
            .client
            .put(&url)
            .json(&record)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.into()))?;

        if !response.status().is_success() {
            return Err(StoreError::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(())
    }

    async fn get_score(
        &self,
        user: User,
        date: NaiveDate,
    ) -> Result<Option<ScoreRecord>, StoreError> {
        let url = self.document_url(user, date);
        debug!("Reading score document from {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.into()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::UnexpectedStatus(response.status().as_u16()));
        }

        let record = response
            .json::<ScoreRecord>()
            .await
            .map_err(|e| StoreError::MalformedDocument(e.into()))?;
        Ok(Some(record))
    }

    async fn list_scores(&self, user: User) -> Result<Vec<ScoreRecord>, StoreError> {
        let url = self.partition_url(user);
        debug!("Enumerating partition {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.into()))?;

        // A partition nobody has ever written to doesn't exist on the store.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }
        if !response.status().is_success() {
            return Err(StoreError::UnexpectedStatus(response.status().as_u16()));
        }

        let records = response
            .json::<Vec<ScoreRecord>>()
            .await
            .map_err(|e| StoreError::MalformedDocument(e.into()))?;
        Ok(records)
    }
}
