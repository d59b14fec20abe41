//! The rule engine façade.
//!
//! [`TaxEngine`] owns one validated [`RateSchedule`] and exposes every
//! operation as a pure function of its arguments: no wall clock is read, no
//! input is modified and nothing is retained between calls. A single engine
//! can therefore be shared across threads and called concurrently.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use tax_core::{CalculationInput, RateSchedule, TaxEngine};
//!
//! let engine = TaxEngine::new(RateSchedule::uae_2024()).unwrap();
//! let input = CalculationInput {
//!     entity_id: "ENT-001".to_string(),
//!     tax_year: 2024,
//!     accounting_income: dec!(400000),
//!     ..CalculationInput::default()
//! };
//! let as_of = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//!
//! let result = engine.calculate_cit(&input, as_of).unwrap();
//!
//! assert_eq!(result.summary.net_tax_due, dec!(2250.00));
//! assert_eq!(result.rate_schedule_version, "UAE-CIT-2024.1");
//! assert_eq!(result.filing.installment_schedule.len(), 4);
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculations::{
    CitCalculator, ComplianceReviewer, EligibilityAssessor, FilingScheduleGenerator,
    ThresholdMonitor, VatCalculator,
};
use crate::error::EngineError;
use crate::models::{
    CalculationInput, CalculationResult, CalculationSummary, EligibilityAssessment,
    FilingRequirements, QfzpProfile, RateSchedule, ThresholdSnapshot, VatCalculation, VatInput,
};

/// Number of entries every CIT audit trail carries.
pub const CIT_AUDIT_STEPS: usize = 9;

#[derive(Debug, Clone)]
pub struct TaxEngine {
    schedule: RateSchedule,
}

impl TaxEngine {
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] when the schedule fails
    /// validation.
    pub fn new(schedule: RateSchedule) -> Result<Self, EngineError> {
        schedule.validate()?;
        Ok(Self { schedule })
    }

    pub fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    pub fn assess_eligibility(
        &self,
        profile: &QfzpProfile,
    ) -> EligibilityAssessment {
        EligibilityAssessor::new(&self.schedule).assess(profile)
    }

    pub fn project_thresholds(
        &self,
        current_revenue: Decimal,
        elapsed_months: u32,
    ) -> ThresholdSnapshot {
        ThresholdMonitor::new(&self.schedule).project(current_revenue, elapsed_months)
    }

    /// Runs a complete CIT calculation.
    ///
    /// Input is validated before any step runs, so a rejected input never
    /// produces a partial audit trail. Once assembled, the result is checked
    /// against the engine's arithmetic invariants and discarded if any fail.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] listing every offending field
    /// - [`EngineError::DateOutOfRange`] when filing dates cannot be derived
    /// - [`EngineError::ArithmeticInvariant`] when the result is internally
    ///   inconsistent
    pub fn calculate_cit(
        &self,
        input: &CalculationInput,
        as_of: NaiveDate,
    ) -> Result<CalculationResult, EngineError> {
        input.validate()?;

        let eligibility = input
            .qfzp_profile
            .as_ref()
            .map(|profile| self.assess_eligibility(profile));
        let threshold_snapshot = input.revenue_to_date.as_ref().map(|revenue| {
            self.project_thresholds(revenue.current_revenue, revenue.elapsed_months)
        });

        let outcome = CitCalculator::new(&self.schedule).calculate(input);
        let compliance = ComplianceReviewer::new(&self.schedule).review(
            input,
            &outcome,
            eligibility.as_ref(),
            threshold_snapshot.as_ref(),
        );
        let filing = self.schedule_filing(input.tax_year, outcome.summary.net_liability, as_of)?;

        let result = CalculationResult {
            entity_id: input.entity_id.clone(),
            tax_year: input.tax_year,
            rate_schedule_version: self.schedule.version.clone(),
            calculated_on: as_of,
            summary: outcome.summary,
            breakdown: outcome.breakdown,
            compliance,
            audit_trail: outcome.audit_trail,
            filing,
            eligibility,
            threshold_snapshot,
        };

        if let Err(violation) = check_invariants(&result) {
            warn!(
                entity_id = %result.entity_id,
                tax_year = result.tax_year,
                violation = %violation,
                "calculation discarded"
            );
            return Err(violation);
        }

        info!(
            entity_id = %result.entity_id,
            tax_year = result.tax_year,
            rate_basis = result.summary.rate_basis.label(),
            net_tax_due = %result.summary.net_tax_due,
            refund_due = %result.summary.refund_due,
            "corporate tax calculated"
        );

        Ok(result)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] listing every offending field.
    pub fn calculate_vat(
        &self,
        input: &VatInput,
    ) -> Result<VatCalculation, EngineError> {
        input.validate()?;
        let vat = VatCalculator::new(&self.schedule).calculate(input);

        info!(
            output_vat = %vat.output_vat,
            input_vat = %vat.input_vat,
            net_vat_due = %vat.net_vat_due,
            "VAT calculated"
        );

        Ok(vat)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::DateOutOfRange`] when a deadline cannot be
    /// represented for `tax_year`.
    pub fn schedule_filing(
        &self,
        tax_year: i32,
        net_liability: Decimal,
        as_of: NaiveDate,
    ) -> Result<FilingRequirements, EngineError> {
        FilingScheduleGenerator::new(&self.schedule).generate(tax_year, net_liability, as_of)
    }
}

fn check_invariants(result: &CalculationResult) -> Result<(), EngineError> {
    let CalculationSummary {
        taxable_income,
        gross_liability,
        relief_applied,
        net_liability,
        installments_paid,
        credits,
        net_tax_due,
        refund_due,
        ..
    } = result.summary;

    let violation = if net_tax_due < Decimal::ZERO || refund_due < Decimal::ZERO {
        Some(format!(
            "negative final position: due {net_tax_due}, refund {refund_due}"
        ))
    } else if net_tax_due > Decimal::ZERO && refund_due > Decimal::ZERO {
        Some(format!(
            "both tax due ({net_tax_due}) and refund ({refund_due}) are positive"
        ))
    } else if taxable_income < Decimal::ZERO {
        Some(format!("negative taxable income {taxable_income}"))
    } else if net_liability != gross_liability - relief_applied {
        Some(format!(
            "net liability {net_liability} != gross {gross_liability} - relief {relief_applied}"
        ))
    } else if net_tax_due - refund_due != net_liability - installments_paid - credits {
        Some(format!(
            "final position {} does not reconcile with liability {net_liability} less payments {}",
            net_tax_due - refund_due,
            installments_paid + credits,
        ))
    } else if result.audit_trail.len() != CIT_AUDIT_STEPS || !result.audit_trail.is_contiguous() {
        Some(format!(
            "audit trail has {} entries, expected {CIT_AUDIT_STEPS} contiguous steps",
            result.audit_trail.len()
        ))
    } else {
        None
    };

    violation.map_or(Ok(()), |message| {
        Err(EngineError::ArithmeticInvariant(message))
    })
}
