use std::io::Read;

use tax_core::{
    ConfigurationError, RateSchedule, RateScheduleRecord, RateScheduleRepository, RepositoryError,
};
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading rate schedule data.
#[derive(Debug, Error)]
pub enum RateScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    /// `row` is 1-based, excluding the header.
    #[error("Invalid rate schedule on row {row}: {source}")]
    Configuration {
        row: usize,
        #[source]
        source: ConfigurationError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for RateScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        RateScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// Loader for versioned rate schedules from CSV files.
///
/// One row per schedule version. Header names match the [`RateSchedule`]
/// field names and an empty cell is a missing constant:
///
/// ```csv
/// version,effective_from,standard_rate,minimum_threshold,...
/// UAE-CIT-2024.1,2023-06-01,0.09,375000,...
/// ```
///
/// Nothing is defaulted; a row missing any constant is rejected.
pub struct RateScheduleLoader;

impl RateScheduleLoader {
    /// Parse and validate rate schedules from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RateSchedule>, RateScheduleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(reader);

        csv_reader
            .deserialize::<RateScheduleRecord>()
            .enumerate()
            .map(|(idx, result)| {
                let record = result?;
                RateSchedule::try_from(record).map_err(|source| {
                    RateScheduleLoaderError::Configuration {
                        row: idx + 1,
                        source,
                    }
                })
            })
            .collect()
    }

    /// Insert parsed schedules into the repository.
    ///
    /// Loading is idempotent: re-inserting an identical version is a no-op,
    /// while a changed version is rejected with
    /// [`RepositoryError::VersionConflict`].
    pub async fn load<R: RateScheduleRepository + ?Sized>(
        repo: &R,
        schedules: &[RateSchedule],
    ) -> Result<usize, RateScheduleLoaderError> {
        for schedule in schedules {
            repo.insert_rate_schedule(schedule.clone()).await?;
        }
        info!(count = schedules.len(), "rate schedules loaded");

        Ok(schedules.len())
    }
}
