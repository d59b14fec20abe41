//! Error taxonomy for the rule engine.
//!
//! Three families of failure exist:
//!
//! | Error | Raised when | Attributed to |
//! |-------|-------------|---------------|
//! | [`InputValidationError`] | a calculation input is malformed | the taxpayer's data, per field |
//! | [`ConfigurationError`] | a rate schedule is incomplete or out of range | the system |
//! | [`EngineError::ArithmeticInvariant`] | a finished result is internally inconsistent | a logic defect |
//!
//! Validation and configuration errors are raised before any audit entry is
//! recorded. Invariant violations are raised after the result is complete,
//! and the result is discarded.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single rejected field in a calculation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. `add_backs.penalties`).
    pub field: String,

    /// Human-readable reason the value was rejected.
    pub reason: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every field that failed validation, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("input validation failed: {}", join_field_errors(.errors))]
pub struct InputValidationError {
    errors: Vec<FieldError>,
}

impl InputValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// The rejected fields, one entry per field.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns `Ok(())` when no field was rejected.
    pub(crate) fn into_result(errors: Vec<FieldError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::new(errors))
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A rate schedule that cannot be used for a calculation.
///
/// Configuration errors are always fatal. No constant is ever defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A required constant was not supplied.
    #[error("rate schedule is missing required constant '{0}'")]
    MissingConstant(&'static str),

    /// The schedule has no version identifier.
    #[error("rate schedule version must not be empty")]
    EmptyVersion,

    /// A rate or ratio must lie within [0, 1].
    #[error("{name} must be between 0 and 1, got {value}")]
    InvalidRate { name: &'static str, value: Decimal },

    /// A percentage must lie within [0, 100].
    #[error("{name} must be between 0 and 100, got {value}")]
    InvalidPercentage { name: &'static str, value: Decimal },

    /// A monetary threshold must be strictly positive.
    #[error("{name} must be positive, got {value}")]
    NonPositiveThreshold { name: &'static str, value: Decimal },

    /// The accrual-accounting band has its bounds reversed.
    #[error("accrual basis lower bound {lower} must be below upper bound {upper}")]
    InvertedAccrualBand { lower: Decimal, upper: Decimal },

    /// The filing deadline offset must be at least one month.
    #[error("filing deadline offset must be at least one month, got {0}")]
    InvalidFilingOffset(u32),

    /// Only a quarterly installment cadence is supported.
    #[error("installment cadence must be quarterly (4 per year), got {0}")]
    UnsupportedInstallmentCadence(u32),
}

/// Errors surfaced by the engine façade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidInput(#[from] InputValidationError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A calendar date could not be derived for the tax year.
    #[error("tax year {0} is outside the supported calendar range")]
    DateOutOfRange(i32),

    /// The finished result violates an arithmetic invariant.
    #[error("arithmetic invariant violated: {0}")]
    ArithmeticInvariant(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn input_validation_error_lists_every_field() {
        let error = InputValidationError::new(vec![
            FieldError::new("entity_id", "must not be empty"),
            FieldError::new("credits.withholding", "must be non-negative"),
        ]);

        assert_eq!(
            error.to_string(),
            "input validation failed: entity_id: must not be empty; credits.withholding: must be non-negative"
        );
        assert_eq!(error.errors().len(), 2);
    }

    #[test]
    fn into_result_is_ok_without_errors() {
        assert_eq!(InputValidationError::into_result(Vec::new()), Ok(()));
    }

    #[test]
    fn configuration_error_converts_into_engine_error() {
        let error: EngineError = ConfigurationError::MissingConstant("standard_rate").into();

        assert_eq!(
            error.to_string(),
            "configuration error: rate schedule is missing required constant 'standard_rate'"
        );
    }
}
