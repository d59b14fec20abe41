use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AuditTrail;
use crate::error::{FieldError, InputValidationError};

/// Period totals for a VAT return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatInput {
    pub sales: Decimal,
    pub purchases: Decimal,
    pub exempt_sales: Decimal,
    pub exempt_purchases: Decimal,
    /// Overrides the schedule's VAT rate when set.
    pub rate: Option<Decimal>,
}

impl VatInput {
    /// Validates every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns [`InputValidationError`] listing each rejected field.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("sales", self.sales),
            ("purchases", self.purchases),
            ("exempt_sales", self.exempt_sales),
            ("exempt_purchases", self.exempt_purchases),
        ] {
            if value < Decimal::ZERO {
                errors.push(FieldError::new(
                    field,
                    format!("must be non-negative, got {value}"),
                ));
            }
        }
        if self.exempt_sales > self.sales {
            errors.push(FieldError::new("exempt_sales", "must not exceed sales"));
        }
        if self.exempt_purchases > self.purchases {
            errors.push(FieldError::new(
                "exempt_purchases",
                "must not exceed purchases",
            ));
        }
        if let Some(rate) = self.rate {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                errors.push(FieldError::new(
                    "rate",
                    format!("must be between 0 and 1, got {rate}"),
                ));
            }
        }

        InputValidationError::into_result(errors)
    }
}

/// Output and input VAT for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatCalculation {
    pub rate_schedule_version: String,
    pub rate: Decimal,
    pub taxable_sales: Decimal,
    pub taxable_purchases: Decimal,
    pub output_vat: Decimal,
    pub input_vat: Decimal,
    /// Never negative. Excess input VAT is not derived as a refund here.
    pub net_vat_due: Decimal,
    pub audit_trail: AuditTrail,
}
