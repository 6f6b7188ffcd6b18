use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::entities::{ScoreRecord, User};

/// Errors coming back from the remote store. Absence of a document is not one of them, point
/// reads fold not-found into `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, or the request timed out.
    #[error("score store is unreachable: {0}")]
    Unavailable(#[source] anyhow::Error),
    /// The store answered outside its contract.
    #[error("score store answered with status {0}")]
    UnexpectedStatus(u16),
    /// A document came back that doesn't parse as a score record.
    #[error("score store returned a malformed document: {0}")]
    MalformedDocument(#[source] anyhow::Error),
}

/// Contract for the remote document store. One partition per user, documents keyed by the ISO
/// date. These three operations are the only ones the application consumes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreStore: Sync + Send + 'static {
    /// Writes or overwrites the record at `record.date` in `user`'s partition.
    async fn put_score(&self, user: User, record: ScoreRecord) -> Result<(), StoreError>;

    /// Point read by date key.
    async fn get_score(
        &self,
        user: User,
        date: NaiveDate,
    ) -> Result<Option<ScoreRecord>, StoreError>;

    /// Enumerates every record in `user`'s partition.
    async fn list_scores(&self, user: User) -> Result<Vec<ScoreRecord>, StoreError>;
}
