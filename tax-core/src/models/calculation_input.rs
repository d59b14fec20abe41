use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, InputValidationError};

/// Earliest tax year the CIT regime applies to.
pub const FIRST_TAX_YEAR: i32 = 2023;

/// Latest tax year accepted by input validation.
pub const LAST_TAX_YEAR: i32 = 2100;

/// Accounting expenses disallowed for tax purposes.
///
/// The list is closed. Each kind carries its own label and citation so the
/// field set and the citation set cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddBackKind {
    NonDeductibleExpenses,
    DepreciationAdjustment,
    ReversedProvisions,
    Penalties,
    Entertainment,
    ExcessiveCompensation,
    RelatedPartyExpense,
    Other,
}

impl AddBackKind {
    /// Every add-back in breakdown order.
    pub const ALL: [AddBackKind; 8] = [
        AddBackKind::NonDeductibleExpenses,
        AddBackKind::DepreciationAdjustment,
        AddBackKind::ReversedProvisions,
        AddBackKind::Penalties,
        AddBackKind::Entertainment,
        AddBackKind::ExcessiveCompensation,
        AddBackKind::RelatedPartyExpense,
        AddBackKind::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NonDeductibleExpenses => "Non-deductible expenses",
            Self::DepreciationAdjustment => "Depreciation adjustment",
            Self::ReversedProvisions => "Reversed provisions",
            Self::Penalties => "Fines and penalties",
            Self::Entertainment => "Entertainment expenditure",
            Self::ExcessiveCompensation => "Excessive compensation",
            Self::RelatedPartyExpense => "Related party expense adjustment",
            Self::Other => "Other add-backs",
        }
    }

    pub fn citation(self) -> &'static str {
        match self {
            Self::NonDeductibleExpenses => "Federal Decree-Law No. 47 of 2022, Article 33",
            Self::DepreciationAdjustment => "Federal Decree-Law No. 47 of 2022, Article 20(2)",
            Self::ReversedProvisions => "Federal Decree-Law No. 47 of 2022, Article 20(2)",
            Self::Penalties => "Federal Decree-Law No. 47 of 2022, Article 33(2)",
            Self::Entertainment => "Federal Decree-Law No. 47 of 2022, Article 32",
            Self::ExcessiveCompensation => "Federal Decree-Law No. 47 of 2022, Article 36",
            Self::RelatedPartyExpense => "Federal Decree-Law No. 47 of 2022, Article 34",
            Self::Other => "Federal Decree-Law No. 47 of 2022, Article 20",
        }
    }

    /// Field name used in validation messages and flat input formats.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::NonDeductibleExpenses => "non_deductible_expenses",
            Self::DepreciationAdjustment => "depreciation_adjustment",
            Self::ReversedProvisions => "reversed_provisions",
            Self::Penalties => "penalties",
            Self::Entertainment => "entertainment",
            Self::ExcessiveCompensation => "excessive_compensation",
            Self::RelatedPartyExpense => "related_party_expense",
            Self::Other => "other",
        }
    }
}

/// Tax deductions not reflected in accounting income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    AcceleratedDepreciation,
    ResearchAndDevelopment,
    CapitalAllowances,
    Provisions,
    CarriedForwardLosses,
    Other,
}

impl DeductionKind {
    /// Every deduction in breakdown order.
    pub const ALL: [DeductionKind; 6] = [
        DeductionKind::AcceleratedDepreciation,
        DeductionKind::ResearchAndDevelopment,
        DeductionKind::CapitalAllowances,
        DeductionKind::Provisions,
        DeductionKind::CarriedForwardLosses,
        DeductionKind::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::AcceleratedDepreciation => "Accelerated depreciation",
            Self::ResearchAndDevelopment => "Research and development",
            Self::CapitalAllowances => "Capital allowances",
            Self::Provisions => "Allowable provisions",
            Self::CarriedForwardLosses => "Tax losses brought forward",
            Self::Other => "Other deductions",
        }
    }

    pub fn citation(self) -> &'static str {
        match self {
            Self::AcceleratedDepreciation => "Federal Decree-Law No. 47 of 2022, Article 20(2)",
            Self::ResearchAndDevelopment => "Federal Decree-Law No. 47 of 2022, Article 28",
            Self::CapitalAllowances => "Federal Decree-Law No. 47 of 2022, Article 20(2)",
            Self::Provisions => "Federal Decree-Law No. 47 of 2022, Article 28",
            Self::CarriedForwardLosses => "Federal Decree-Law No. 47 of 2022, Article 37",
            Self::Other => "Federal Decree-Law No. 47 of 2022, Article 20",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            Self::AcceleratedDepreciation => "accelerated_depreciation",
            Self::ResearchAndDevelopment => "research_and_development",
            Self::CapitalAllowances => "capital_allowances",
            Self::Provisions => "provisions",
            Self::CarriedForwardLosses => "carried_forward_losses",
            Self::Other => "other",
        }
    }
}

/// Add-back amounts, one named field per [`AddBackKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBacks {
    pub non_deductible_expenses: Decimal,
    pub depreciation_adjustment: Decimal,
    pub reversed_provisions: Decimal,
    pub penalties: Decimal,
    pub entertainment: Decimal,
    pub excessive_compensation: Decimal,
    pub related_party_expense: Decimal,
    pub other: Decimal,
}

impl AddBacks {
    pub fn amount(
        &self,
        kind: AddBackKind,
    ) -> Decimal {
        match kind {
            AddBackKind::NonDeductibleExpenses => self.non_deductible_expenses,
            AddBackKind::DepreciationAdjustment => self.depreciation_adjustment,
            AddBackKind::ReversedProvisions => self.reversed_provisions,
            AddBackKind::Penalties => self.penalties,
            AddBackKind::Entertainment => self.entertainment,
            AddBackKind::ExcessiveCompensation => self.excessive_compensation,
            AddBackKind::RelatedPartyExpense => self.related_party_expense,
            AddBackKind::Other => self.other,
        }
    }

    /// Every add-back with its amount, in [`AddBackKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (AddBackKind, Decimal)> + '_ {
        AddBackKind::ALL
            .into_iter()
            .map(|kind| (kind, self.amount(kind)))
    }
}

/// Deduction amounts, one named field per [`DeductionKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    pub accelerated_depreciation: Decimal,
    pub research_and_development: Decimal,
    pub capital_allowances: Decimal,
    pub provisions: Decimal,
    pub carried_forward_losses: Decimal,
    pub other: Decimal,
}

impl Deductions {
    pub fn amount(
        &self,
        kind: DeductionKind,
    ) -> Decimal {
        match kind {
            DeductionKind::AcceleratedDepreciation => self.accelerated_depreciation,
            DeductionKind::ResearchAndDevelopment => self.research_and_development,
            DeductionKind::CapitalAllowances => self.capital_allowances,
            DeductionKind::Provisions => self.provisions,
            DeductionKind::CarriedForwardLosses => self.carried_forward_losses,
            DeductionKind::Other => self.other,
        }
    }

    /// Every deduction with its amount, in [`DeductionKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (DeductionKind, Decimal)> + '_ {
        DeductionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.amount(kind)))
    }
}

/// Free-zone position declared by the taxpayer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeZoneStatus {
    pub is_free_zone: bool,
    pub qualifying_income: Decimal,
    pub non_qualifying_income: Decimal,

    /// Pre-computed QFZP qualification. This flag, not the attached
    /// eligibility assessment, selects the 0% rate.
    pub qualifies_for_qfzp: bool,
}

/// Small Business Relief election.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmallBusinessRelief {
    pub qualifies: bool,
    pub relief_amount: Decimal,
}

/// Credits set against net liability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCredits {
    pub withholding: Decimal,
    pub foreign: Decimal,
}

/// Facts needed to run the four QFZP eligibility tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QfzpProfile {
    pub qualifying_income: Decimal,
    pub excluded_income: Decimal,

    /// Declared activities, matched case-insensitively against the
    /// qualifying and excluded activity catalogues.
    pub activities: Vec<String>,

    /// Sourced from a separate substance-verification process.
    pub has_adequate_substance: bool,

    /// Sourced from a separate substance-verification process.
    pub is_uae_controlled: bool,

    /// Share held by natural persons, 0..=100.
    pub natural_person_ownership_pct: Decimal,
}

/// Revenue recognised so far in the current year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueToDate {
    pub current_revenue: Decimal,
    pub elapsed_months: u32,
}

/// One immutable input per (entity, tax year) CIT calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub entity_id: String,
    pub tax_year: i32,

    /// Net profit or loss per the financial statements. May be negative.
    pub accounting_income: Decimal,

    pub add_backs: AddBacks,
    pub deductions: Deductions,
    pub free_zone: FreeZoneStatus,
    pub small_business_relief: SmallBusinessRelief,

    /// Quarterly installments already paid, Q1 through Q4.
    pub installments_paid: [Decimal; 4],

    pub credits: TaxCredits,

    /// When present, the engine attaches an eligibility assessment.
    pub qfzp_profile: Option<QfzpProfile>,

    /// When present, the engine attaches a threshold snapshot.
    pub revenue_to_date: Option<RevenueToDate>,
}

impl CalculationInput {
    /// Validates every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns [`InputValidationError`] listing each rejected field.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        let mut errors = Vec::new();

        if self.entity_id.trim().is_empty() {
            errors.push(FieldError::new("entity_id", "must not be empty"));
        }
        if !(FIRST_TAX_YEAR..=LAST_TAX_YEAR).contains(&self.tax_year) {
            errors.push(FieldError::new(
                "tax_year",
                format!("must be between {FIRST_TAX_YEAR} and {LAST_TAX_YEAR}"),
            ));
        }

        for (kind, amount) in self.add_backs.iter() {
            check_non_negative(&mut errors, format!("add_backs.{}", kind.field_name()), amount);
        }
        for (kind, amount) in self.deductions.iter() {
            check_non_negative(&mut errors, format!("deductions.{}", kind.field_name()), amount);
        }

        check_non_negative(
            &mut errors,
            "free_zone.qualifying_income",
            self.free_zone.qualifying_income,
        );
        check_non_negative(
            &mut errors,
            "free_zone.non_qualifying_income",
            self.free_zone.non_qualifying_income,
        );
        check_non_negative(
            &mut errors,
            "small_business_relief.relief_amount",
            self.small_business_relief.relief_amount,
        );
        for (idx, amount) in self.installments_paid.iter().enumerate() {
            check_non_negative(&mut errors, format!("installments_paid.q{}", idx + 1), *amount);
        }
        check_non_negative(&mut errors, "credits.withholding", self.credits.withholding);
        check_non_negative(&mut errors, "credits.foreign", self.credits.foreign);

        if let Some(profile) = &self.qfzp_profile {
            check_non_negative(
                &mut errors,
                "qfzp_profile.qualifying_income",
                profile.qualifying_income,
            );
            check_non_negative(
                &mut errors,
                "qfzp_profile.excluded_income",
                profile.excluded_income,
            );
            check_percentage(
                &mut errors,
                "qfzp_profile.natural_person_ownership_pct",
                profile.natural_person_ownership_pct,
            );
        }

        if let Some(revenue) = &self.revenue_to_date {
            check_non_negative(
                &mut errors,
                "revenue_to_date.current_revenue",
                revenue.current_revenue,
            );
            if revenue.elapsed_months > 12 {
                errors.push(FieldError::new(
                    "revenue_to_date.elapsed_months",
                    "must not exceed 12",
                ));
            }
        }

        InputValidationError::into_result(errors)
    }
}

fn check_non_negative(
    errors: &mut Vec<FieldError>,
    field: impl Into<String>,
    value: Decimal,
) {
    if value < Decimal::ZERO {
        errors.push(FieldError::new(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
}

fn check_percentage(
    errors: &mut Vec<FieldError>,
    field: impl Into<String>,
    value: Decimal,
) {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        errors.push(FieldError::new(
            field,
            format!("must be between 0 and 100, got {value}"),
        ));
    }
}
