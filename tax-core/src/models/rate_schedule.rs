use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

const UAE_CIT_EFFECTIVE_FROM: NaiveDate = match NaiveDate::from_ymd_opt(2023, 6, 1) {
    Some(date) => date,
    None => panic!("invalid effective date"),
};

/// Versioned regulatory constants used by every engine component.
///
/// A schedule is immutable once published. Results record the `version`
/// they were computed under so an audited figure can always be reproduced.
///
/// Rates and ratios are fractions (`0.09` = 9%). Percentages are 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    /// Identifier cited by audit trails (e.g. `UAE-CIT-2024.1`).
    pub version: String,

    /// First day this schedule applies to.
    pub effective_from: NaiveDate,

    /// Standard CIT rate applied above the minimum threshold.
    pub standard_rate: Decimal,

    /// Taxable income up to this amount is taxed at 0%.
    pub minimum_threshold: Decimal,

    /// Small Business Relief ceiling on taxable income.
    pub small_business_relief_threshold: Decimal,

    /// Cap on absolute qualifying income for the QFZP income test.
    ///
    /// Distinct from `small_business_relief_threshold`; the two are
    /// separate rules and must never be substituted for each other.
    pub qfzp_income_cap: Decimal,

    /// Minimum qualifying share of total income for the QFZP income test.
    pub qfzp_min_qualifying_income_pct: Decimal,

    /// Minimum natural-person ownership for the QFZP ownership test.
    pub qfzp_min_natural_person_ownership_pct: Decimal,

    /// Standard VAT rate.
    pub vat_rate: Decimal,

    /// Mandatory VAT registration threshold.
    pub vat_registration_threshold: Decimal,

    /// Share of the VAT threshold at which a registration alert fires.
    pub vat_alert_ratio: Decimal,

    /// Revenue above which audited financial statements are required.
    pub audit_threshold: Decimal,

    /// Share of the audit threshold at which projected revenue raises an alert.
    pub audit_alert_ratio: Decimal,

    /// Lower bound of the cash-to-accrual switch alert band.
    pub accrual_basis_lower: Decimal,

    /// Upper bound of the cash-to-accrual switch alert band.
    pub accrual_basis_upper: Decimal,

    /// Months after year end by which the return must be filed.
    pub filing_deadline_months: u32,

    /// Installments per year. Only quarterly (4) is supported.
    pub installments_per_year: u32,
}

impl RateSchedule {
    /// The reference UAE configuration.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::RateSchedule;
    ///
    /// let schedule = RateSchedule::uae_2024();
    ///
    /// assert_eq!(schedule.standard_rate, dec!(0.09));
    /// assert_eq!(schedule.minimum_threshold, dec!(375000));
    /// assert!(schedule.validate().is_ok());
    /// ```
    pub fn uae_2024() -> Self {
        Self {
            version: "UAE-CIT-2024.1".to_string(),
            effective_from: UAE_CIT_EFFECTIVE_FROM,
            standard_rate: Decimal::new(9, 2),
            minimum_threshold: Decimal::from(375_000),
            small_business_relief_threshold: Decimal::from(3_000_000),
            qfzp_income_cap: Decimal::from(375_000),
            qfzp_min_qualifying_income_pct: Decimal::from(90),
            qfzp_min_natural_person_ownership_pct: Decimal::from(50),
            vat_rate: Decimal::new(5, 2),
            vat_registration_threshold: Decimal::from(375_000),
            vat_alert_ratio: Decimal::new(80, 2),
            audit_threshold: Decimal::from(50_000_000),
            audit_alert_ratio: Decimal::new(70, 2),
            accrual_basis_lower: Decimal::from(2_500_000),
            accrual_basis_upper: Decimal::from(3_000_000),
            filing_deadline_months: 9,
            installments_per_year: 4,
        }
    }

    /// Checks every constant is within its valid range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.version.trim().is_empty() {
            return Err(ConfigurationError::EmptyVersion);
        }

        for (name, value) in [
            ("standard_rate", self.standard_rate),
            ("vat_rate", self.vat_rate),
            ("vat_alert_ratio", self.vat_alert_ratio),
            ("audit_alert_ratio", self.audit_alert_ratio),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(ConfigurationError::InvalidRate { name, value });
            }
        }

        for (name, value) in [
            (
                "qfzp_min_qualifying_income_pct",
                self.qfzp_min_qualifying_income_pct,
            ),
            (
                "qfzp_min_natural_person_ownership_pct",
                self.qfzp_min_natural_person_ownership_pct,
            ),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                return Err(ConfigurationError::InvalidPercentage { name, value });
            }
        }

        for (name, value) in [
            ("minimum_threshold", self.minimum_threshold),
            (
                "small_business_relief_threshold",
                self.small_business_relief_threshold,
            ),
            ("qfzp_income_cap", self.qfzp_income_cap),
            ("vat_registration_threshold", self.vat_registration_threshold),
            ("audit_threshold", self.audit_threshold),
            ("accrual_basis_lower", self.accrual_basis_lower),
            ("accrual_basis_upper", self.accrual_basis_upper),
        ] {
            if value <= Decimal::ZERO {
                return Err(ConfigurationError::NonPositiveThreshold { name, value });
            }
        }

        if self.accrual_basis_lower >= self.accrual_basis_upper {
            return Err(ConfigurationError::InvertedAccrualBand {
                lower: self.accrual_basis_lower,
                upper: self.accrual_basis_upper,
            });
        }
        if self.filing_deadline_months == 0 {
            return Err(ConfigurationError::InvalidFilingOffset(
                self.filing_deadline_months,
            ));
        }
        if self.installments_per_year != 4 {
            return Err(ConfigurationError::UnsupportedInstallmentCadence(
                self.installments_per_year,
            ));
        }

        Ok(())
    }
}

/// A rate schedule as supplied by an external source, every constant optional.
///
/// Converting into a [`RateSchedule`] fails on the first missing constant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateScheduleRecord {
    pub version: Option<String>,
    pub effective_from: Option<NaiveDate>,
    pub standard_rate: Option<Decimal>,
    pub minimum_threshold: Option<Decimal>,
    pub small_business_relief_threshold: Option<Decimal>,
    pub qfzp_income_cap: Option<Decimal>,
    pub qfzp_min_qualifying_income_pct: Option<Decimal>,
    pub qfzp_min_natural_person_ownership_pct: Option<Decimal>,
    pub vat_rate: Option<Decimal>,
    pub vat_registration_threshold: Option<Decimal>,
    pub vat_alert_ratio: Option<Decimal>,
    pub audit_threshold: Option<Decimal>,
    pub audit_alert_ratio: Option<Decimal>,
    pub accrual_basis_lower: Option<Decimal>,
    pub accrual_basis_upper: Option<Decimal>,
    pub filing_deadline_months: Option<u32>,
    pub installments_per_year: Option<u32>,
}

fn required<T>(
    value: Option<T>,
    name: &'static str,
) -> Result<T, ConfigurationError> {
    value.ok_or(ConfigurationError::MissingConstant(name))
}

impl TryFrom<RateScheduleRecord> for RateSchedule {
    type Error = ConfigurationError;

    fn try_from(record: RateScheduleRecord) -> Result<Self, Self::Error> {
        let schedule = Self {
            version: required(record.version, "version")?,
            effective_from: required(record.effective_from, "effective_from")?,
            standard_rate: required(record.standard_rate, "standard_rate")?,
            minimum_threshold: required(record.minimum_threshold, "minimum_threshold")?,
            small_business_relief_threshold: required(
                record.small_business_relief_threshold,
                "small_business_relief_threshold",
            )?,
            qfzp_income_cap: required(record.qfzp_income_cap, "qfzp_income_cap")?,
            qfzp_min_qualifying_income_pct: required(
                record.qfzp_min_qualifying_income_pct,
                "qfzp_min_qualifying_income_pct",
            )?,
            qfzp_min_natural_person_ownership_pct: required(
                record.qfzp_min_natural_person_ownership_pct,
                "qfzp_min_natural_person_ownership_pct",
            )?,
            vat_rate: required(record.vat_rate, "vat_rate")?,
            vat_registration_threshold: required(
                record.vat_registration_threshold,
                "vat_registration_threshold",
            )?,
            vat_alert_ratio: required(record.vat_alert_ratio, "vat_alert_ratio")?,
            audit_threshold: required(record.audit_threshold, "audit_threshold")?,
            audit_alert_ratio: required(record.audit_alert_ratio, "audit_alert_ratio")?,
            accrual_basis_lower: required(record.accrual_basis_lower, "accrual_basis_lower")?,
            accrual_basis_upper: required(record.accrual_basis_upper, "accrual_basis_upper")?,
            filing_deadline_months: required(
                record.filing_deadline_months,
                "filing_deadline_months",
            )?,
            installments_per_year: required(
                record.installments_per_year,
                "installments_per_year",
            )?,
        };
        schedule.validate()?;
        Ok(schedule)
    }
}

impl From<&RateSchedule> for RateScheduleRecord {
    fn from(schedule: &RateSchedule) -> Self {
        Self {
            version: Some(schedule.version.clone()),
            effective_from: Some(schedule.effective_from),
            standard_rate: Some(schedule.standard_rate),
            minimum_threshold: Some(schedule.minimum_threshold),
            small_business_relief_threshold: Some(schedule.small_business_relief_threshold),
            qfzp_income_cap: Some(schedule.qfzp_income_cap),
            qfzp_min_qualifying_income_pct: Some(schedule.qfzp_min_qualifying_income_pct),
            qfzp_min_natural_person_ownership_pct: Some(
                schedule.qfzp_min_natural_person_ownership_pct,
            ),
            vat_rate: Some(schedule.vat_rate),
            vat_registration_threshold: Some(schedule.vat_registration_threshold),
            vat_alert_ratio: Some(schedule.vat_alert_ratio),
            audit_threshold: Some(schedule.audit_threshold),
            audit_alert_ratio: Some(schedule.audit_alert_ratio),
            accrual_basis_lower: Some(schedule.accrual_basis_lower),
            accrual_basis_upper: Some(schedule.accrual_basis_upper),
            filing_deadline_months: Some(schedule.filing_deadline_months),
            installments_per_year: Some(schedule.installments_per_year),
        }
    }
}
