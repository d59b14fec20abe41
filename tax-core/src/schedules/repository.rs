use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::RateSchedule;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    /// Published versions are immutable; a second insert with different
    /// constants is rejected.
    #[error("Rate schedule version '{0}' already exists with different constants")]
    VersionConflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait RateScheduleRepository: Send + Sync {
    async fn get_rate_schedule(&self, version: &str) -> Result<RateSchedule, RepositoryError>;

    /// Latest schedule whose `effective_from` is on or before `date`.
    async fn effective_for(&self, date: NaiveDate) -> Result<RateSchedule, RepositoryError>;

    /// Every stored version, ordered by effective date then version.
    async fn list_versions(&self) -> Result<Vec<String>, RepositoryError>;

    async fn insert_rate_schedule(&self, schedule: RateSchedule) -> Result<(), RepositoryError>;
}
