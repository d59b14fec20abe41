use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditTrail, EligibilityAssessment, ThresholdSnapshot};

/// Which rule selected the applicable CIT rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateBasis {
    QualifyingFreeZonePerson,
    SmallBusinessRelief,
    BelowMinimumThreshold,
    StandardRate,
}

impl RateBasis {
    pub fn label(self) -> &'static str {
        match self {
            Self::QualifyingFreeZonePerson => "Qualifying Free Zone Person",
            Self::SmallBusinessRelief => "Small Business Relief",
            Self::BelowMinimumThreshold => "Below minimum threshold",
            Self::StandardRate => "Standard rate",
        }
    }

    pub fn citation(self) -> &'static str {
        match self {
            Self::QualifyingFreeZonePerson => "Federal Decree-Law No. 47 of 2022, Article 18",
            Self::SmallBusinessRelief => "Federal Decree-Law No. 47 of 2022, Article 21",
            Self::BelowMinimumThreshold => "Federal Decree-Law No. 47 of 2022, Article 3(1)(a)",
            Self::StandardRate => "Federal Decree-Law No. 47 of 2022, Article 3(1)(b)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakdownType {
    AddBack,
    Deduction,
    Credit,
    Liability,
}

/// A non-zero line item contributing to the final position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub category: String,
    pub amount: Decimal,
    pub item_type: BreakdownType,
    pub citation: String,
}

/// Headline figures of a CIT calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationSummary {
    pub accounting_income: Decimal,
    pub total_add_backs: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,
    pub applicable_rate: Decimal,
    pub rate_basis: RateBasis,
    pub gross_liability: Decimal,
    pub relief_applied: Decimal,
    pub net_liability: Decimal,
    pub installments_paid: Decimal,
    pub credits: Decimal,
    pub net_tax_due: Decimal,
    pub refund_due: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub filing_required: bool,
    pub installments_required: bool,
    pub loss_carry_forward_available: bool,
    pub warnings: Vec<String>,
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    Paid,
    Pending,
    Overdue,
}

/// One quarterly installment of the following tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentScheduleEntry {
    /// 1-based quarter number.
    pub quarter: u32,
    /// Display label, e.g. `Q1 2025`.
    pub label: String,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: InstallmentStatus,
}

impl InstallmentScheduleEntry {
    /// Derives the status of this installment.
    ///
    /// `cumulative_due` is the total of this and every earlier installment.
    pub fn status_on(
        &self,
        as_of: NaiveDate,
        cumulative_due: Decimal,
        paid_to_date: Decimal,
    ) -> InstallmentStatus {
        if paid_to_date >= cumulative_due {
            InstallmentStatus::Paid
        } else if self.due_date < as_of {
            InstallmentStatus::Overdue
        } else {
            InstallmentStatus::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRequirements {
    pub filing_deadline: NaiveDate,
    pub required_documents: Vec<String>,
    pub installment_schedule: Vec<InstallmentScheduleEntry>,
}

impl FilingRequirements {
    /// Returns a copy with every installment status re-derived for `as_of`
    /// and the amount paid so far toward the schedule.
    pub fn with_statuses(
        &self,
        as_of: NaiveDate,
        paid_to_date: Decimal,
    ) -> Self {
        let mut cumulative_due = Decimal::ZERO;
        let installment_schedule = self
            .installment_schedule
            .iter()
            .map(|entry| {
                cumulative_due += entry.amount;
                InstallmentScheduleEntry {
                    status: entry.status_on(as_of, cumulative_due, paid_to_date),
                    ..entry.clone()
                }
            })
            .collect();

        Self {
            installment_schedule,
            ..self.clone()
        }
    }
}

/// The engine's sole output. Produced once per invocation and handed to the
/// caller; the engine keeps no reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub entity_id: String,
    pub tax_year: i32,
    /// The rate schedule version every figure below was computed under.
    pub rate_schedule_version: String,
    /// Evaluation date used to derive installment statuses.
    pub calculated_on: NaiveDate,
    pub summary: CalculationSummary,
    pub breakdown: Vec<BreakdownItem>,
    pub compliance: ComplianceCheck,
    pub audit_trail: AuditTrail,
    pub filing: FilingRequirements,
    pub eligibility: Option<EligibilityAssessment>,
    pub threshold_snapshot: Option<ThresholdSnapshot>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        year: i32,
        month: u32,
        day: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn entry(
        quarter: u32,
        due_date: NaiveDate,
    ) -> InstallmentScheduleEntry {
        InstallmentScheduleEntry {
            quarter,
            label: format!("Q{quarter} 2025"),
            due_date,
            amount: dec!(1000.00),
            status: InstallmentStatus::Pending,
        }
    }

    #[test]
    fn status_is_paid_when_cumulative_amount_covered() {
        let e = entry(1, date(2025, 3, 15));

        let status = e.status_on(date(2025, 4, 1), dec!(1000.00), dec!(1000.00));

        assert_eq!(status, InstallmentStatus::Paid);
    }

    #[test]
    fn status_is_overdue_after_due_date_when_unpaid() {
        let e = entry(1, date(2025, 3, 15));

        let status = e.status_on(date(2025, 3, 16), dec!(1000.00), Decimal::ZERO);

        assert_eq!(status, InstallmentStatus::Overdue);
    }

    #[test]
    fn status_is_pending_on_due_date() {
        let e = entry(1, date(2025, 3, 15));

        let status = e.status_on(date(2025, 3, 15), dec!(1000.00), Decimal::ZERO);

        assert_eq!(status, InstallmentStatus::Pending);
    }

    #[test]
    fn with_statuses_applies_partial_payment_in_quarter_order() {
        let filing = FilingRequirements {
            filing_deadline: date(2025, 9, 30),
            required_documents: Vec::new(),
            installment_schedule: vec![
                entry(1, date(2025, 3, 15)),
                entry(2, date(2025, 6, 15)),
                entry(3, date(2025, 9, 15)),
            ],
        };

        let refreshed = filing.with_statuses(date(2025, 7, 1), dec!(1500.00));
        let statuses: Vec<_> = refreshed
            .installment_schedule
            .iter()
            .map(|e| e.status)
            .collect();

        assert_eq!(
            statuses,
            vec![
                InstallmentStatus::Paid,
                InstallmentStatus::Overdue,
                InstallmentStatus::Pending,
            ]
        );
    }

    #[test]
    fn breakdown_type_serialises_in_screaming_case() {
        let json = serde_json::to_string(&BreakdownType::AddBack).unwrap();

        assert_eq!(json, "\"ADD_BACK\"");
    }
}
