//! CSV loader for corporate tax calculation inputs.
//!
//! ## CSV Format
//!
//! One row per (entity, tax year). Headers are matched by name, so column
//! order does not matter and optional columns may be omitted entirely.
//!
//! | Column | Required | Type | Notes |
//! |--------|----------|------|-------|
//! | `entity_id` | yes | string | |
//! | `tax_year` | yes | integer | e.g. `2024` |
//! | `accounting_income` | yes | decimal | negative for a loss |
//! | `non_deductible_expenses` … `other_add_backs` | no | decimal | one column per add-back, empty = 0 |
//! | `accelerated_depreciation` … `other_deductions` | no | decimal | one column per deduction, empty = 0 |
//! | `is_free_zone`, `qualifies_for_qfzp` | no | bool | empty = `false` |
//! | `free_zone_qualifying_income`, `free_zone_non_qualifying_income` | no | decimal | |
//! | `small_business_relief`, `relief_amount` | no | bool, decimal | |
//! | `installment_q1` … `installment_q4` | no | decimal | amounts already paid |
//! | `withholding_credit`, `foreign_credit` | no | decimal | |
//! | `qfzp_*` | group | | see below |
//! | `current_revenue`, `elapsed_months` | group | decimal, integer | see below |
//!
//! ### Optional groups
//!
//! The QFZP profile is attached when any `qfzp_*` cell is populated. It then
//! needs `qfzp_qualifying_income`, `qfzp_has_adequate_substance`,
//! `qfzp_is_uae_controlled` and `qfzp_natural_person_ownership_pct`;
//! `qfzp_excluded_income` defaults to zero and `qfzp_activities` is a
//! `;`-separated list (e.g. `trading;logistics`).
//!
//! Revenue-to-date is attached when `current_revenue` or `elapsed_months` is
//! populated, and then both are required.
//!
//! ### Minimal example
//!
//! ```csv
//! entity_id,tax_year,accounting_income
//! ENT-001,2024,400000.00
//! ```
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{
    AddBacks, CalculationInput, Deductions, FreeZoneStatus, QfzpProfile, RevenueToDate,
    SmallBusinessRelief, TaxCredits,
};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    entity_id: String,
    tax_year: i32,
    accounting_income: Decimal,

    non_deductible_expenses: Option<Decimal>,
    depreciation_adjustment: Option<Decimal>,
    reversed_provisions: Option<Decimal>,
    penalties: Option<Decimal>,
    entertainment: Option<Decimal>,
    excessive_compensation: Option<Decimal>,
    related_party_expense: Option<Decimal>,
    other_add_backs: Option<Decimal>,

    accelerated_depreciation: Option<Decimal>,
    research_and_development: Option<Decimal>,
    capital_allowances: Option<Decimal>,
    provisions: Option<Decimal>,
    carried_forward_losses: Option<Decimal>,
    other_deductions: Option<Decimal>,

    is_free_zone: Option<bool>,
    free_zone_qualifying_income: Option<Decimal>,
    free_zone_non_qualifying_income: Option<Decimal>,
    qualifies_for_qfzp: Option<bool>,

    small_business_relief: Option<bool>,
    relief_amount: Option<Decimal>,

    installment_q1: Option<Decimal>,
    installment_q2: Option<Decimal>,
    installment_q3: Option<Decimal>,
    installment_q4: Option<Decimal>,
    withholding_credit: Option<Decimal>,
    foreign_credit: Option<Decimal>,

    qfzp_qualifying_income: Option<Decimal>,
    qfzp_excluded_income: Option<Decimal>,
    qfzp_activities: Option<String>,
    qfzp_has_adequate_substance: Option<bool>,
    qfzp_is_uae_controlled: Option<bool>,
    qfzp_natural_person_ownership_pct: Option<Decimal>,

    current_revenue: Option<Decimal>,
    elapsed_months: Option<u32>,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting input rows.
#[derive(Debug, thiserror::Error)]
pub enum InputLoadError {
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, type mismatch, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// An optional group was partially populated. `row` is 1-based
    /// (header = row 0).
    #[error("{group} on row {row} is missing '{missing}'")]
    IncompleteGroup {
        group: &'static str,
        missing: &'static str,
        row: usize,
    },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn amount(value: Option<Decimal>) -> Decimal {
    value.unwrap_or_default()
}

fn group_field<T>(
    value: Option<T>,
    group: &'static str,
    missing: &'static str,
    row: usize,
) -> Result<T, InputLoadError> {
    value.ok_or(InputLoadError::IncompleteGroup {
        group,
        missing,
        row,
    })
}

fn parse_activities(cell: Option<String>) -> Vec<String> {
    cell.map(|list| {
        list.split(';')
            .map(str::trim)
            .filter(|activity| !activity.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn qfzp_profile(
    row: &mut CsvRow,
    row_number: usize,
) -> Result<Option<QfzpProfile>, InputLoadError> {
    const GROUP: &str = "qfzp_profile";

    let populated = row.qfzp_qualifying_income.is_some()
        || row.qfzp_excluded_income.is_some()
        || row.qfzp_activities.is_some()
        || row.qfzp_has_adequate_substance.is_some()
        || row.qfzp_is_uae_controlled.is_some()
        || row.qfzp_natural_person_ownership_pct.is_some();
    if !populated {
        return Ok(None);
    }

    Ok(Some(QfzpProfile {
        qualifying_income: group_field(
            row.qfzp_qualifying_income,
            GROUP,
            "qfzp_qualifying_income",
            row_number,
        )?,
        excluded_income: amount(row.qfzp_excluded_income),
        activities: parse_activities(row.qfzp_activities.take()),
        has_adequate_substance: group_field(
            row.qfzp_has_adequate_substance,
            GROUP,
            "qfzp_has_adequate_substance",
            row_number,
        )?,
        is_uae_controlled: group_field(
            row.qfzp_is_uae_controlled,
            GROUP,
            "qfzp_is_uae_controlled",
            row_number,
        )?,
        natural_person_ownership_pct: group_field(
            row.qfzp_natural_person_ownership_pct,
            GROUP,
            "qfzp_natural_person_ownership_pct",
            row_number,
        )?,
    }))
}

fn revenue_to_date(
    row: &CsvRow,
    row_number: usize,
) -> Result<Option<RevenueToDate>, InputLoadError> {
    const GROUP: &str = "revenue_to_date";

    if row.current_revenue.is_none() && row.elapsed_months.is_none() {
        return Ok(None);
    }

    Ok(Some(RevenueToDate {
        current_revenue: group_field(row.current_revenue, GROUP, "current_revenue", row_number)?,
        elapsed_months: group_field(row.elapsed_months, GROUP, "elapsed_months", row_number)?,
    }))
}

/// Convert a single CSV row into a CalculationInput.
///
/// row_number is 1-based (for error messages).
fn convert_row(
    mut row: CsvRow,
    row_number: usize,
) -> Result<CalculationInput, InputLoadError> {
    let qfzp_profile = qfzp_profile(&mut row, row_number)?;
    let revenue_to_date = revenue_to_date(&row, row_number)?;

    Ok(CalculationInput {
        entity_id: row.entity_id,
        tax_year: row.tax_year,
        accounting_income: row.accounting_income,
        add_backs: AddBacks {
            non_deductible_expenses: amount(row.non_deductible_expenses),
            depreciation_adjustment: amount(row.depreciation_adjustment),
            reversed_provisions: amount(row.reversed_provisions),
            penalties: amount(row.penalties),
            entertainment: amount(row.entertainment),
            excessive_compensation: amount(row.excessive_compensation),
            related_party_expense: amount(row.related_party_expense),
            other: amount(row.other_add_backs),
        },
        deductions: Deductions {
            accelerated_depreciation: amount(row.accelerated_depreciation),
            research_and_development: amount(row.research_and_development),
            capital_allowances: amount(row.capital_allowances),
            provisions: amount(row.provisions),
            carried_forward_losses: amount(row.carried_forward_losses),
            other: amount(row.other_deductions),
        },
        free_zone: FreeZoneStatus {
            is_free_zone: row.is_free_zone.unwrap_or(false),
            qualifying_income: amount(row.free_zone_qualifying_income),
            non_qualifying_income: amount(row.free_zone_non_qualifying_income),
            qualifies_for_qfzp: row.qualifies_for_qfzp.unwrap_or(false),
        },
        small_business_relief: SmallBusinessRelief {
            qualifies: row.small_business_relief.unwrap_or(false),
            relief_amount: amount(row.relief_amount),
        },
        installments_paid: [
            amount(row.installment_q1),
            amount(row.installment_q2),
            amount(row.installment_q3),
            amount(row.installment_q4),
        ],
        credits: TaxCredits {
            withholding: amount(row.withholding_credit),
            foreign: amount(row.foreign_credit),
        },
        qfzp_profile,
        revenue_to_date,
    })
}

/// Parse CSV text and return one CalculationInput per row, in file order.
///
/// Values are not range-checked here; [`CalculationInput::validate`] reports
/// every offending field.
///
/// # Errors
///
/// * [InputLoadError::Parse] – if the CSV is structurally invalid or a
///   field cannot be deserialised.
/// * [InputLoadError::IncompleteGroup] – if an optional group is only
///   partially populated.
pub fn load_from_str(input: &str) -> Result<Vec<CalculationInput>, InputLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

/// Read a file from disk and delegate to [load_from_str].
pub fn load_from_file(path: &Path) -> Result<Vec<CalculationInput>, InputLoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const MINIMAL_CSV: &str = "\
entity_id,tax_year,accounting_income
ENT-001,2024,400000.00
";

    const ADJUSTMENTS_CSV: &str = "\
entity_id,tax_year,accounting_income,penalties,related_party_expense,carried_forward_losses,installment_q2,withholding_credit,small_business_relief,relief_amount
ENT-002,2024,-50000.00,1500.00,,20000.00,750.00,125.50,true,
";

    const GROUPS_CSV: &str = "\
entity_id,tax_year,accounting_income,is_free_zone,qualifies_for_qfzp,qfzp_qualifying_income,qfzp_excluded_income,qfzp_activities,qfzp_has_adequate_substance,qfzp_is_uae_controlled,qfzp_natural_person_ownership_pct,current_revenue,elapsed_months
ENT-003,2024,2000000.00,true,true,200000,10000, trading ; banking ,true,true,60,320000,8
";

    #[test]
    fn test_minimal_row_defaults_optional_columns() {
        let inputs = load_from_str(MINIMAL_CSV).expect("minimal CSV should load");

        assert_eq!(
            inputs,
            vec![CalculationInput {
                entity_id: "ENT-001".to_string(),
                tax_year: 2024,
                accounting_income: dec!(400000.00),
                ..CalculationInput::default()
            }]
        );
    }

    #[test]
    fn test_adjustment_columns_map_to_fields() {
        let inputs = load_from_str(ADJUSTMENTS_CSV).unwrap();
        let input = &inputs[0];

        assert_eq!(input.accounting_income, dec!(-50000.00));
        assert_eq!(input.add_backs.penalties, dec!(1500.00));
        assert_eq!(input.add_backs.related_party_expense, Decimal::ZERO);
        assert_eq!(input.deductions.carried_forward_losses, dec!(20000.00));
        assert_eq!(
            input.installments_paid,
            [Decimal::ZERO, dec!(750.00), Decimal::ZERO, Decimal::ZERO]
        );
        assert_eq!(input.credits.withholding, dec!(125.50));
        assert!(input.small_business_relief.qualifies);
        assert_eq!(input.small_business_relief.relief_amount, Decimal::ZERO);
    }

    #[test]
    fn test_groups_attached_when_populated() {
        let inputs = load_from_str(GROUPS_CSV).unwrap();
        let input = &inputs[0];

        let profile = input.qfzp_profile.as_ref().expect("profile attached");
        assert_eq!(profile.activities, vec!["trading", "banking"]);
        assert_eq!(profile.natural_person_ownership_pct, dec!(60));
        assert_eq!(
            input.revenue_to_date,
            Some(RevenueToDate {
                current_revenue: dec!(320000),
                elapsed_months: 8,
            })
        );
        assert!(input.free_zone.qualifies_for_qfzp);
    }

    #[test]
    fn test_partial_qfzp_group_is_rejected() {
        let csv = "\
entity_id,tax_year,accounting_income,qfzp_qualifying_income,qfzp_has_adequate_substance
ENT-004,2024,1000,200000,true
";

        let err = load_from_str(csv).expect_err("partial group should fail");

        let InputLoadError::IncompleteGroup {
            group,
            missing,
            row,
        } = err
        else {
            panic!("Expected IncompleteGroup, got: {:?}", err);
        };
        assert_eq!(
            (group, missing, row),
            ("qfzp_profile", "qfzp_is_uae_controlled", 1)
        );
    }

    #[test]
    fn test_partial_revenue_group_is_rejected() {
        let csv = "\
entity_id,tax_year,accounting_income,current_revenue,elapsed_months
ENT-001,2024,1000,,
ENT-005,2024,1000,300000,
";

        let err = load_from_str(csv).expect_err("partial group should fail");

        assert!(matches!(
            err,
            InputLoadError::IncompleteGroup {
                group: "revenue_to_date",
                missing: "elapsed_months",
                row: 2,
            }
        ));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "entity_id,tax_year\nENT-001,2024\n";

        let err = load_from_str(csv).expect_err("missing column should fail");

        let InputLoadError::Parse(inner) = err else {
            panic!("Expected Parse error, got: {:?}", err);
        };
        assert!(inner.to_string().contains("missing field"));
    }

    #[test]
    fn test_negative_amounts_load_for_later_validation() {
        let csv = "entity_id,tax_year,accounting_income,penalties\nENT-001,2024,1000,-5\n";

        let inputs = load_from_str(csv).unwrap();

        assert_eq!(inputs[0].add_backs.penalties, dec!(-5));
        assert!(inputs[0].validate().is_err());
    }
}
