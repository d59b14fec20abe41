//! Filing deadline and quarterly installment schedule.
//!
//! The return is due `filing_deadline_months` after the end of the tax year
//! (Dec 31 + 9 months = Sep 30 under the reference schedule). When a positive
//! net liability remains, it is split into quarterly installments falling on
//! the 15th of months 3, 6, 9 and 12 of the following year. Each installment
//! is `net_liability / 4` rounded to two places; the final installment
//! absorbs the rounding remainder so the schedule always sums exactly to the
//! liability.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::error::EngineError;
use crate::models::{FilingRequirements, InstallmentScheduleEntry, InstallmentStatus, RateSchedule};

/// Day of the month each installment falls due.
const INSTALLMENT_DUE_DAY: u32 = 15;

/// Documents every corporate tax return is filed with.
pub const REQUIRED_DOCUMENTS: [&str; 4] = [
    "Audited financial statements",
    "Corporate tax computation schedule",
    "Transfer pricing documentation (if applicable)",
    "Supporting schedules for add-backs, deductions and credits",
];

#[derive(Debug, Clone)]
pub struct FilingScheduleGenerator<'a> {
    schedule: &'a RateSchedule,
}

impl<'a> FilingScheduleGenerator<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self { schedule }
    }

    /// Builds the filing requirements for `tax_year`, deriving each
    /// installment's status for `as_of` with nothing yet paid toward the
    /// following year's schedule.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DateOutOfRange`] when a deadline cannot be
    /// represented as a calendar date.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::FilingScheduleGenerator;
    /// use tax_core::RateSchedule;
    ///
    /// let schedule = RateSchedule::uae_2024();
    /// let as_of = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    ///
    /// let filing = FilingScheduleGenerator::new(&schedule)
    ///     .generate(2024, dec!(2250), as_of)
    ///     .unwrap();
    ///
    /// assert_eq!(filing.filing_deadline, NaiveDate::from_ymd_opt(2025, 9, 30).unwrap());
    /// assert_eq!(filing.installment_schedule.len(), 4);
    /// assert_eq!(filing.installment_schedule[0].amount, dec!(562.50));
    /// ```
    pub fn generate(
        &self,
        tax_year: i32,
        net_liability: Decimal,
        as_of: NaiveDate,
    ) -> Result<FilingRequirements, EngineError> {
        let filing = FilingRequirements {
            filing_deadline: self.filing_deadline(tax_year)?,
            required_documents: REQUIRED_DOCUMENTS.iter().map(|d| d.to_string()).collect(),
            installment_schedule: self.installments(tax_year, net_liability)?,
        };

        Ok(filing.with_statuses(as_of, Decimal::ZERO))
    }

    fn filing_deadline(
        &self,
        tax_year: i32,
    ) -> Result<NaiveDate, EngineError> {
        NaiveDate::from_ymd_opt(tax_year, 12, 31)
            .and_then(|year_end| {
                year_end.checked_add_months(Months::new(self.schedule.filing_deadline_months))
            })
            .ok_or(EngineError::DateOutOfRange(tax_year))
    }

    fn installments(
        &self,
        tax_year: i32,
        net_liability: Decimal,
    ) -> Result<Vec<InstallmentScheduleEntry>, EngineError> {
        let count = self.schedule.installments_per_year;
        if net_liability <= Decimal::ZERO || count == 0 {
            return Ok(Vec::new());
        }

        let payment_year = tax_year
            .checked_add(1)
            .ok_or(EngineError::DateOutOfRange(tax_year))?;
        let months_between = 12 / count;
        let each = round_half_up(net_liability / Decimal::from(count));
        let mut allocated = Decimal::ZERO;

        (1..=count)
            .map(|quarter| -> Result<InstallmentScheduleEntry, EngineError> {
                let month = months_between * quarter;
                let due_date = NaiveDate::from_ymd_opt(payment_year, month, INSTALLMENT_DUE_DAY)
                    .ok_or(EngineError::DateOutOfRange(tax_year))?;
                let amount = if quarter == count {
                    net_liability - allocated
                } else {
                    each
                };
                allocated += amount;

                Ok(InstallmentScheduleEntry {
                    quarter,
                    label: format!("Q{quarter} {payment_year}"),
                    due_date,
                    amount,
                    status: InstallmentStatus::Pending,
                })
            })
            .collect()
    }
}
