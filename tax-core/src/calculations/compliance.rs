//! Compliance flags, warnings and requirements derived from a completed
//! CIT calculation.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::cit::CitOutcome;
use crate::calculations::common::fmt_amount;
use crate::models::{
    CalculationInput, ComplianceCheck, EligibilityAssessment, RateSchedule, ThresholdSnapshot,
};

const FILING_REQUIREMENT: &str = "File the corporate tax return by the filing deadline";
const INSTALLMENT_REQUIREMENT: &str =
    "Pay quarterly corporate tax installments per the installment schedule";
const TRANSFER_PRICING_REQUIREMENT: &str =
    "Prepare transfer pricing documentation for related party transactions";

#[derive(Debug, Clone)]
pub struct ComplianceReviewer<'a> {
    schedule: &'a RateSchedule,
}

impl<'a> ComplianceReviewer<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self { schedule }
    }

    pub fn review(
        &self,
        input: &CalculationInput,
        outcome: &CitOutcome,
        eligibility: Option<&EligibilityAssessment>,
        threshold_snapshot: Option<&ThresholdSnapshot>,
    ) -> ComplianceCheck {
        let summary = &outcome.summary;
        let mut check = ComplianceCheck {
            filing_required: summary.taxable_income > self.schedule.minimum_threshold,
            installments_required: summary.net_liability > Decimal::ZERO,
            loss_carry_forward_available: outcome.unfloored_taxable_income < Decimal::ZERO,
            ..ComplianceCheck::default()
        };

        if check.filing_required {
            check.requirements.push(FILING_REQUIREMENT.to_string());
        }
        if check.installments_required {
            check.requirements.push(INSTALLMENT_REQUIREMENT.to_string());
        }
        if input.add_backs.related_party_expense > Decimal::ZERO {
            check
                .requirements
                .push(TRANSFER_PRICING_REQUIREMENT.to_string());
        }

        if check.loss_carry_forward_available {
            let loss = -outcome.unfloored_taxable_income;
            warn!(
                entity_id = %input.entity_id,
                tax_year = input.tax_year,
                loss = %loss,
                "tax loss available for carry-forward"
            );
            check.warnings.push(format!(
                "Tax loss of AED {} is available to carry forward against future taxable income",
                fmt_amount(loss)
            ));
        }

        if input.free_zone.is_free_zone
            && input.free_zone.qualifies_for_qfzp
            && eligibility.is_some_and(|assessment| !assessment.is_eligible)
        {
            check.warnings.push(
                "QFZP status is declared but the attached eligibility assessment does not pass all tests"
                    .to_string(),
            );
        }

        if input.small_business_relief.qualifies
            && summary.taxable_income > self.schedule.small_business_relief_threshold
        {
            check.warnings.push(format!(
                "Small Business Relief is claimed but taxable income of AED {} exceeds the AED {} relief threshold",
                fmt_amount(summary.taxable_income),
                fmt_amount(self.schedule.small_business_relief_threshold),
            ));
        }

        for alert in threshold_snapshot.iter().flat_map(|s| s.alerts.iter()) {
            if alert.action_required {
                check.requirements.push(alert.message.clone());
            } else {
                check.warnings.push(alert.message.clone());
            }
        }

        check
    }
}
