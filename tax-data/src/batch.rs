//! Runs the engine over a batch of inputs, resolving each input's rate
//! schedule from a repository.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::NaiveDate;
use serde::Serialize;
use tax_core::{
    CalculationInput, CalculationResult, EngineError, FieldError, RateSchedule,
    RateScheduleRepository, RepositoryError, TaxEngine,
};
use thiserror::Error;
use tracing::debug;

/// Errors that abort a batch. Invalid inputs never abort; they are
/// reported in [`BatchOutcome::rejected`].
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No rate schedule for tax year {tax_year}: {source}")]
    Schedule {
        tax_year: i32,
        #[source]
        source: RepositoryError,
    },

    #[error("Calculation failed for {entity_id} ({tax_year}): {source}")]
    Engine {
        entity_id: String,
        tax_year: i32,
        #[source]
        source: EngineError,
    },
}

/// An input skipped because it failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedInput {
    pub entity_id: String,
    pub tax_year: i32,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<CalculationResult>,
    pub rejected: Vec<RejectedInput>,
}

/// Calculates every input in order.
///
/// With `pinned_version` every input uses that schedule; otherwise each
/// input uses the schedule in effect on the last day of its tax year.
/// Engines are built once per schedule version and reused.
pub async fn run_batch<R: RateScheduleRepository + ?Sized>(
    repo: &R,
    inputs: &[CalculationInput],
    pinned_version: Option<&str>,
    as_of: NaiveDate,
) -> Result<BatchOutcome, BatchError> {
    let mut engines: HashMap<String, TaxEngine> = HashMap::new();
    let mut outcome = BatchOutcome::default();

    for input in inputs {
        if let Err(err) = input.validate() {
            debug!(
                entity_id = %input.entity_id,
                tax_year = input.tax_year,
                "input rejected: {err}"
            );
            outcome.rejected.push(RejectedInput {
                entity_id: input.entity_id.clone(),
                tax_year: input.tax_year,
                errors: err.errors().to_vec(),
            });
            continue;
        }

        let schedule = resolve_schedule(repo, input.tax_year, pinned_version).await?;
        let engine = match engines.entry(schedule.version.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(version = %schedule.version, "building engine");
                let engine = TaxEngine::new(schedule).map_err(|source| BatchError::Engine {
                    entity_id: input.entity_id.clone(),
                    tax_year: input.tax_year,
                    source,
                })?;
                entry.insert(engine)
            }
        };

        let result = engine
            .calculate_cit(input, as_of)
            .map_err(|source| BatchError::Engine {
                entity_id: input.entity_id.clone(),
                tax_year: input.tax_year,
                source,
            })?;
        outcome.results.push(result);
    }

    Ok(outcome)
}

async fn resolve_schedule<R: RateScheduleRepository + ?Sized>(
    repo: &R,
    tax_year: i32,
    pinned_version: Option<&str>,
) -> Result<RateSchedule, BatchError> {
    let lookup = match pinned_version {
        Some(version) => repo.get_rate_schedule(version).await,
        None => match NaiveDate::from_ymd_opt(tax_year, 12, 31) {
            Some(year_end) => repo.effective_for(year_end).await,
            None => Err(RepositoryError::NotFound),
        },
    };

    lookup.map_err(|source| BatchError::Schedule { tax_year, source })
}
