//! Corporate tax and VAT rule engine for UAE small and medium enterprises.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Inputs, results and the versioned [`RateSchedule`] |
//! | [`calculations`] | Eligibility, thresholds, CIT, VAT, compliance and filing |
//! | [`engine`] | The [`TaxEngine`] façade tying the calculators together |
//! | [`schedules`] | Versioned rate schedule storage |
//! | [`error`] | Validation, configuration and engine errors |

pub mod calculations;
pub mod engine;
pub mod error;
pub mod models;
pub mod schedules;

pub use engine::TaxEngine;
pub use error::{ConfigurationError, EngineError, FieldError, InputValidationError};
pub use models::*;
pub use schedules::{InMemoryRateScheduleRepository, RateScheduleRepository, RepositoryError};
