//! In-process rate schedule store.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use super::repository::{RateScheduleRepository, RepositoryError};
use crate::models::RateSchedule;

/// Stores schedules keyed by version behind a [`RwLock`].
///
/// Reads vastly outnumber writes: schedules are loaded once at startup and
/// then shared by every calculation.
#[derive(Debug, Default)]
pub struct InMemoryRateScheduleRepository {
    schedules: RwLock<BTreeMap<String, RateSchedule>>,
}

impl InMemoryRateScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository pre-seeded with [`RateSchedule::uae_2024`].
    pub fn with_reference_schedule() -> Self {
        let reference = RateSchedule::uae_2024();
        let schedules = BTreeMap::from([(reference.version.clone(), reference)]);
        Self {
            schedules: RwLock::new(schedules),
        }
    }
}

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Storage("rate schedule lock poisoned".to_string())
}

#[async_trait]
impl RateScheduleRepository for InMemoryRateScheduleRepository {
    async fn get_rate_schedule(&self, version: &str) -> Result<RateSchedule, RepositoryError> {
        let schedules = self.schedules.read().map_err(poisoned)?;
        schedules
            .get(version)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn effective_for(&self, date: NaiveDate) -> Result<RateSchedule, RepositoryError> {
        let schedules = self.schedules.read().map_err(poisoned)?;
        schedules
            .values()
            .filter(|s| s.effective_from <= date)
            .max_by(|a, b| {
                a.effective_from
                    .cmp(&b.effective_from)
                    .then_with(|| a.version.cmp(&b.version))
            })
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_versions(&self) -> Result<Vec<String>, RepositoryError> {
        let schedules = self.schedules.read().map_err(poisoned)?;
        let mut stored: Vec<_> = schedules.values().collect();
        stored.sort_by(|a, b| {
            a.effective_from
                .cmp(&b.effective_from)
                .then_with(|| a.version.cmp(&b.version))
        });
        Ok(stored.into_iter().map(|s| s.version.clone()).collect())
    }

    async fn insert_rate_schedule(&self, schedule: RateSchedule) -> Result<(), RepositoryError> {
        let mut schedules = self.schedules.write().map_err(poisoned)?;
        match schedules.get(&schedule.version) {
            Some(existing) if *existing == schedule => {
                debug!(version = %schedule.version, "rate schedule already stored");
                Ok(())
            }
            Some(_) => Err(RepositoryError::VersionConflict(schedule.version)),
            None => {
                debug!(
                    version = %schedule.version,
                    effective_from = %schedule.effective_from,
                    "rate schedule stored"
                );
                schedules.insert(schedule.version.clone(), schedule);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule_2026() -> RateSchedule {
        RateSchedule {
            version: "UAE-CIT-2026.1".to_string(),
            effective_from: date(2026, 1, 1),
            standard_rate: dec!(0.15),
            ..RateSchedule::uae_2024()
        }
    }

    #[tokio::test]
    async fn get_unknown_version_is_not_found() {
        let repo = InMemoryRateScheduleRepository::new();

        let result = repo.get_rate_schedule("missing").await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn reference_schedule_is_preloaded() {
        let repo = InMemoryRateScheduleRepository::with_reference_schedule();

        let schedule = repo.get_rate_schedule("UAE-CIT-2024.1").await.unwrap();

        assert_eq!(schedule, RateSchedule::uae_2024());
    }

    #[tokio::test]
    async fn effective_for_picks_latest_applicable_version() {
        let repo = InMemoryRateScheduleRepository::with_reference_schedule();
        repo.insert_rate_schedule(schedule_2026()).await.unwrap();

        let in_2025 = repo.effective_for(date(2025, 12, 31)).await.unwrap();
        let in_2026 = repo.effective_for(date(2026, 12, 31)).await.unwrap();

        assert_eq!(in_2025.version, "UAE-CIT-2024.1");
        assert_eq!(in_2026.version, "UAE-CIT-2026.1");
    }

    #[tokio::test]
    async fn effective_for_before_any_schedule_is_not_found() {
        let repo = InMemoryRateScheduleRepository::with_reference_schedule();

        let result = repo.effective_for(date(2020, 1, 1)).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn reinserting_identical_schedule_is_a_no_op() {
        let repo = InMemoryRateScheduleRepository::with_reference_schedule();

        repo.insert_rate_schedule(RateSchedule::uae_2024())
            .await
            .unwrap();

        assert_eq!(repo.list_versions().await.unwrap(), vec!["UAE-CIT-2024.1"]);
    }

    #[tokio::test]
    async fn published_version_cannot_change() {
        let repo = InMemoryRateScheduleRepository::with_reference_schedule();
        let mut altered = RateSchedule::uae_2024();
        altered.standard_rate = dec!(0.10);

        let result = repo.insert_rate_schedule(altered).await;

        assert_eq!(
            result,
            Err(RepositoryError::VersionConflict("UAE-CIT-2024.1".to_string()))
        );
    }

    #[tokio::test]
    async fn list_versions_orders_by_effective_date() {
        let repo = InMemoryRateScheduleRepository::new();
        repo.insert_rate_schedule(schedule_2026()).await.unwrap();
        repo.insert_rate_schedule(RateSchedule::uae_2024())
            .await
            .unwrap();

        let versions = repo.list_versions().await.unwrap();

        assert_eq!(versions, vec!["UAE-CIT-2024.1", "UAE-CIT-2026.1"]);
    }
}
