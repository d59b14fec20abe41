//! VAT output/input calculation for a single return period.
//!
//! ```text
//! taxable sales     = sales − exempt sales
//! taxable purchases = purchases − exempt purchases
//! output VAT        = taxable sales × rate
//! input VAT         = taxable purchases × rate
//! net VAT due       = max(0, output VAT − input VAT)
//! ```
//!
//! Excess input VAT is not turned into a refund here; a refund claim is a
//! separately declared figure.

use rust_decimal::Decimal;

use crate::calculations::audit_trail::{AuditStep, AuditTrailRecorder};
use crate::calculations::common::{fmt_amount, fmt_rate, max, round_half_up};
use crate::models::{RateSchedule, VatCalculation, VatInput};

const TAXABLE_SUPPLIES_CITATION: &str = "Federal Decree-Law No. 8 of 2017, Articles 45-46";
const OUTPUT_VAT_CITATION: &str = "Federal Decree-Law No. 8 of 2017, Article 3";
const INPUT_VAT_CITATION: &str = "Federal Decree-Law No. 8 of 2017, Article 54";
const NET_VAT_CITATION: &str = "Federal Decree-Law No. 8 of 2017, Article 70";

#[derive(Debug, Clone)]
pub struct VatCalculator<'a> {
    schedule: &'a RateSchedule,
}

impl<'a> VatCalculator<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self { schedule }
    }

    /// Calculates VAT for a validated input. The rate override on the input
    /// takes precedence over the schedule's VAT rate.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::VatCalculator;
    /// use tax_core::{RateSchedule, VatInput};
    ///
    /// let schedule = RateSchedule::uae_2024();
    /// let input = VatInput {
    ///     sales: dec!(101680),
    ///     purchases: dec!(10500),
    ///     ..VatInput::default()
    /// };
    ///
    /// let vat = VatCalculator::new(&schedule).calculate(&input);
    ///
    /// assert_eq!(vat.output_vat, dec!(5084.00));
    /// assert_eq!(vat.input_vat, dec!(525.00));
    /// assert_eq!(vat.net_vat_due, dec!(4559.00));
    /// ```
    pub fn calculate(
        &self,
        input: &VatInput,
    ) -> VatCalculation {
        let rate = input.rate.unwrap_or(self.schedule.vat_rate);
        let mut recorder = AuditTrailRecorder::new();

        let taxable_sales = round_half_up(input.sales - input.exempt_sales);
        let taxable_purchases = round_half_up(input.purchases - input.exempt_purchases);
        recorder.record(AuditStep::new(
            "Taxable sales and purchases",
            format!(
                "sales {} - exempt {} = {}; purchases {} - exempt {} = {}",
                fmt_amount(input.sales),
                fmt_amount(input.exempt_sales),
                fmt_amount(taxable_sales),
                fmt_amount(input.purchases),
                fmt_amount(input.exempt_purchases),
                fmt_amount(taxable_purchases),
            ),
            taxable_sales,
            TAXABLE_SUPPLIES_CITATION,
        ));

        let output_vat = round_half_up(taxable_sales * rate);
        recorder.record(AuditStep::new(
            "Output VAT on taxable sales",
            format!(
                "{} × {} = {}",
                fmt_amount(taxable_sales),
                fmt_rate(rate),
                fmt_amount(output_vat)
            ),
            output_vat,
            format!(
                "{OUTPUT_VAT_CITATION} (rate schedule {})",
                self.schedule.version
            ),
        ));

        let input_vat = round_half_up(taxable_purchases * rate);
        recorder.record(AuditStep::new(
            "Recoverable input VAT on taxable purchases",
            format!(
                "{} × {} = {}",
                fmt_amount(taxable_purchases),
                fmt_rate(rate),
                fmt_amount(input_vat)
            ),
            input_vat,
            INPUT_VAT_CITATION,
        ));

        let net_vat_due = max(output_vat - input_vat, Decimal::ZERO);
        recorder.record(AuditStep::new(
            "Net VAT due",
            format!(
                "max(0, {} - {}) = {}",
                fmt_amount(output_vat),
                fmt_amount(input_vat),
                fmt_amount(net_vat_due)
            ),
            net_vat_due,
            NET_VAT_CITATION,
        ));

        VatCalculation {
            rate_schedule_version: self.schedule.version.clone(),
            rate,
            taxable_sales,
            taxable_purchases,
            output_vat,
            input_vat,
            net_vat_due,
            audit_trail: recorder.finish(),
        }
    }
}
