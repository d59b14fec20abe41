//! Corporate Income Tax liability calculation.
//!
//! The calculation is a fold over nine ordered step functions. Each step
//! consumes the running state produced by the previous one and returns the
//! next state together with exactly one audit trail entry, so the trail can
//! never be recorded out of order or with a step missing.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1 | Accounting income (may be negative) |
//! | 2 | Total add-backs (each non-zero one itemised) |
//! | 3 | Total deductions (each non-zero one itemised) |
//! | 4 | Taxable income: max(0, step 1 + step 2 − step 3) |
//! | 5 | Applicable rate: QFZP → Small Business Relief → minimum threshold → standard |
//! | 6 | Gross liability |
//! | 7 | Relief applied and net liability |
//! | 8 | Installments paid and tax credits |
//! | 9 | Net tax due or refund due |
//!
//! Under the standard rate only the slice of taxable income above the
//! minimum threshold is charged.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::CitCalculator;
//! use tax_core::{CalculationInput, RateBasis, RateSchedule};
//!
//! let schedule = RateSchedule::uae_2024();
//! let input = CalculationInput {
//!     entity_id: "ENT-001".to_string(),
//!     tax_year: 2024,
//!     accounting_income: dec!(400000),
//!     ..CalculationInput::default()
//! };
//!
//! let outcome = CitCalculator::new(&schedule).calculate(&input);
//!
//! // (400,000 − 375,000) × 9% = 2,250
//! assert_eq!(outcome.summary.rate_basis, RateBasis::StandardRate);
//! assert_eq!(outcome.summary.net_tax_due, dec!(2250.00));
//! assert_eq!(outcome.audit_trail.len(), 9);
//! ```

use rust_decimal::Decimal;

use crate::calculations::audit_trail::{AuditStep, AuditTrailRecorder};
use crate::calculations::common::{fmt_amount, fmt_rate, max, round_half_up};
use crate::models::{
    AuditTrail, BreakdownItem, BreakdownType, CalculationInput, CalculationSummary, RateBasis,
    RateSchedule,
};

const ACCOUNTING_INCOME_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Article 20(1)";
const ADD_BACKS_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Articles 28-36";
const DEDUCTIONS_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Articles 20 and 37";
const TAXABLE_INCOME_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Article 20";
const GROSS_LIABILITY_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Article 3";
const RELIEF_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Article 21";
const INSTALLMENTS_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Article 48";
const WITHHOLDING_CREDIT_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Article 46";
const FOREIGN_CREDIT_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Article 47";
const NET_POSITION_CITATION: &str = "Federal Decree-Law No. 47 of 2022, Article 48";

/// Everything the CIT fold produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitOutcome {
    pub summary: CalculationSummary,
    pub breakdown: Vec<BreakdownItem>,
    pub audit_trail: AuditTrail,

    /// Step 4's value before flooring at zero. Negative means a loss is
    /// available to carry forward.
    pub unfloored_taxable_income: Decimal,
}

/// Running totals threaded through the nine steps.
#[derive(Debug, Clone)]
struct CitState {
    accounting_income: Decimal,
    total_add_backs: Decimal,
    total_deductions: Decimal,
    unfloored_taxable_income: Decimal,
    taxable_income: Decimal,
    applicable_rate: Decimal,
    rate_basis: RateBasis,
    gross_liability: Decimal,
    relief_applied: Decimal,
    net_liability: Decimal,
    installments_paid: Decimal,
    credits: Decimal,
    net_tax_due: Decimal,
    refund_due: Decimal,
    breakdown: Vec<BreakdownItem>,
}

impl CitState {
    fn empty() -> Self {
        Self {
            accounting_income: Decimal::ZERO,
            total_add_backs: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            unfloored_taxable_income: Decimal::ZERO,
            taxable_income: Decimal::ZERO,
            applicable_rate: Decimal::ZERO,
            rate_basis: RateBasis::BelowMinimumThreshold,
            gross_liability: Decimal::ZERO,
            relief_applied: Decimal::ZERO,
            net_liability: Decimal::ZERO,
            installments_paid: Decimal::ZERO,
            credits: Decimal::ZERO,
            net_tax_due: Decimal::ZERO,
            refund_due: Decimal::ZERO,
            breakdown: Vec::new(),
        }
    }

    fn into_outcome(
        self,
        audit_trail: AuditTrail,
    ) -> CitOutcome {
        CitOutcome {
            summary: CalculationSummary {
                accounting_income: self.accounting_income,
                total_add_backs: self.total_add_backs,
                total_deductions: self.total_deductions,
                taxable_income: self.taxable_income,
                applicable_rate: self.applicable_rate,
                rate_basis: self.rate_basis,
                gross_liability: self.gross_liability,
                relief_applied: self.relief_applied,
                net_liability: self.net_liability,
                installments_paid: self.installments_paid,
                credits: self.credits,
                net_tax_due: self.net_tax_due,
                refund_due: self.refund_due,
            },
            breakdown: self.breakdown,
            audit_trail,
            unfloored_taxable_income: self.unfloored_taxable_income,
        }
    }
}

struct StepContext<'a> {
    schedule: &'a RateSchedule,
    input: &'a CalculationInput,
}

type CitStep = fn(&StepContext<'_>, CitState) -> (CitState, AuditStep);

const CIT_STEPS: [CitStep; 9] = [
    seed_accounting_income,
    sum_add_backs,
    sum_deductions,
    determine_taxable_income,
    determine_rate,
    compute_gross_liability,
    apply_relief,
    sum_payments_and_credits,
    settle_position,
];

/// Calculator for CIT liability under a single [`RateSchedule`].
#[derive(Debug, Clone)]
pub struct CitCalculator<'a> {
    schedule: &'a RateSchedule,
}

impl<'a> CitCalculator<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self { schedule }
    }

    /// Runs the nine steps in order. The input is never modified.
    pub fn calculate(
        &self,
        input: &CalculationInput,
    ) -> CitOutcome {
        let ctx = StepContext {
            schedule: self.schedule,
            input,
        };
        let mut recorder = AuditTrailRecorder::new();

        let state = CIT_STEPS.iter().fold(CitState::empty(), |state, step| {
            let (next, entry) = step(&ctx, state);
            recorder.record(entry);
            next
        });

        state.into_outcome(recorder.finish())
    }
}

/// Renders `a + b + c = total`, or `none = 0.00` when there are no terms.
fn sum_expression(
    terms: &[Decimal],
    total: Decimal,
) -> String {
    if terms.is_empty() {
        return format!("none = {}", fmt_amount(total));
    }
    let joined = terms
        .iter()
        .map(|t| fmt_amount(*t))
        .collect::<Vec<_>>()
        .join(" + ");
    format!("{joined} = {}", fmt_amount(total))
}

// Step 1
fn seed_accounting_income(
    ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let accounting_income = round_half_up(ctx.input.accounting_income);
    let entry = AuditStep::new(
        "Accounting income (loss) per financial statements",
        format!("accounting income = {}", fmt_amount(accounting_income)),
        accounting_income,
        ACCOUNTING_INCOME_CITATION,
    );

    (
        CitState {
            accounting_income,
            ..state
        },
        entry,
    )
}

// Step 2
fn sum_add_backs(
    ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let items: Vec<_> = ctx
        .input
        .add_backs
        .iter()
        .map(|(kind, amount)| (kind, round_half_up(amount)))
        .filter(|(_, amount)| !amount.is_zero())
        .collect();
    let amounts: Vec<Decimal> = items.iter().map(|(_, amount)| *amount).collect();
    let total_add_backs: Decimal = amounts.iter().copied().sum();

    let mut breakdown = state.breakdown;
    breakdown.extend(items.iter().map(|(kind, amount)| BreakdownItem {
        category: kind.label().to_string(),
        amount: *amount,
        item_type: BreakdownType::AddBack,
        citation: kind.citation().to_string(),
    }));

    let entry = AuditStep::new(
        "Add back expenses disallowed for tax purposes",
        sum_expression(&amounts, total_add_backs),
        total_add_backs,
        ADD_BACKS_CITATION,
    );

    (
        CitState {
            total_add_backs,
            breakdown,
            ..state
        },
        entry,
    )
}

// Step 3
fn sum_deductions(
    ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let items: Vec<_> = ctx
        .input
        .deductions
        .iter()
        .map(|(kind, amount)| (kind, round_half_up(amount)))
        .filter(|(_, amount)| !amount.is_zero())
        .collect();
    let amounts: Vec<Decimal> = items.iter().map(|(_, amount)| *amount).collect();
    let total_deductions: Decimal = amounts.iter().copied().sum();

    let mut breakdown = state.breakdown;
    breakdown.extend(items.iter().map(|(kind, amount)| BreakdownItem {
        category: kind.label().to_string(),
        amount: *amount,
        item_type: BreakdownType::Deduction,
        citation: kind.citation().to_string(),
    }));

    let entry = AuditStep::new(
        "Deduct allowances not reflected in accounting income",
        sum_expression(&amounts, total_deductions),
        total_deductions,
        DEDUCTIONS_CITATION,
    );

    (
        CitState {
            total_deductions,
            breakdown,
            ..state
        },
        entry,
    )
}

// Step 4
fn determine_taxable_income(
    _ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let unfloored_taxable_income =
        state.accounting_income + state.total_add_backs - state.total_deductions;
    let taxable_income = max(unfloored_taxable_income, Decimal::ZERO);

    let entry = AuditStep::new(
        "Taxable income (a loss floors to zero)",
        format!(
            "max(0, {} + {} - {}) = {}",
            fmt_amount(state.accounting_income),
            fmt_amount(state.total_add_backs),
            fmt_amount(state.total_deductions),
            fmt_amount(taxable_income),
        ),
        taxable_income,
        TAXABLE_INCOME_CITATION,
    );

    (
        CitState {
            unfloored_taxable_income,
            taxable_income,
            ..state
        },
        entry,
    )
}

// Step 5: first match wins
fn determine_rate(
    ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let schedule = ctx.schedule;
    let input = ctx.input;
    let taxable = state.taxable_income;

    let (rate_basis, applicable_rate, reason) =
        if input.free_zone.is_free_zone && input.free_zone.qualifies_for_qfzp {
            (
                RateBasis::QualifyingFreeZonePerson,
                Decimal::ZERO,
                "free zone person qualifying as QFZP".to_string(),
            )
        } else if taxable <= schedule.small_business_relief_threshold
            && input.small_business_relief.qualifies
        {
            (
                RateBasis::SmallBusinessRelief,
                Decimal::ZERO,
                format!(
                    "relief elected and taxable income {} <= relief threshold {}",
                    fmt_amount(taxable),
                    fmt_amount(schedule.small_business_relief_threshold),
                ),
            )
        } else if taxable <= schedule.minimum_threshold {
            (
                RateBasis::BelowMinimumThreshold,
                Decimal::ZERO,
                format!(
                    "taxable income {} <= minimum threshold {}",
                    fmt_amount(taxable),
                    fmt_amount(schedule.minimum_threshold),
                ),
            )
        } else {
            (
                RateBasis::StandardRate,
                schedule.standard_rate,
                format!(
                    "taxable income {} > minimum threshold {}",
                    fmt_amount(taxable),
                    fmt_amount(schedule.minimum_threshold),
                ),
            )
        };

    let entry = AuditStep::new(
        format!("Applicable rate: {}", rate_basis.label()),
        format!("{reason} => {}", fmt_rate(applicable_rate)),
        applicable_rate,
        format!(
            "{} (rate schedule {})",
            rate_basis.citation(),
            schedule.version
        ),
    );

    (
        CitState {
            rate_basis,
            applicable_rate,
            ..state
        },
        entry,
    )
}

// Step 6
fn compute_gross_liability(
    ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let (gross_liability, calculation) = if state.rate_basis == RateBasis::StandardRate {
        let chargeable = state.taxable_income - ctx.schedule.minimum_threshold;
        let gross = round_half_up(chargeable * state.applicable_rate);
        (
            gross,
            format!(
                "({} - {}) × {} = {}",
                fmt_amount(state.taxable_income),
                fmt_amount(ctx.schedule.minimum_threshold),
                fmt_rate(state.applicable_rate),
                fmt_amount(gross),
            ),
        )
    } else {
        let gross = round_half_up(state.taxable_income * state.applicable_rate);
        (
            gross,
            format!(
                "{} × {} = {}",
                fmt_amount(state.taxable_income),
                fmt_rate(state.applicable_rate),
                fmt_amount(gross),
            ),
        )
    };

    let entry = AuditStep::new(
        "Gross corporate tax liability",
        calculation,
        gross_liability,
        GROSS_LIABILITY_CITATION,
    );

    (
        CitState {
            gross_liability,
            ..state
        },
        entry,
    )
}

// Step 7
fn apply_relief(
    ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let relief = &ctx.input.small_business_relief;
    let (relief_applied, calculation) = if relief.qualifies {
        let relief_amount = round_half_up(relief.relief_amount);
        let applied = state.gross_liability.min(relief_amount);
        (
            applied,
            format!(
                "{gross} - min({gross}, {}) = {}",
                fmt_amount(relief_amount),
                fmt_amount(state.gross_liability - applied),
                gross = fmt_amount(state.gross_liability),
            ),
        )
    } else {
        (
            Decimal::ZERO,
            format!(
                "{gross} - 0.00 (no relief elected) = {gross}",
                gross = fmt_amount(state.gross_liability),
            ),
        )
    };
    let net_liability = state.gross_liability - relief_applied;

    let entry = AuditStep::new(
        "Relief applied and net liability",
        calculation,
        net_liability,
        RELIEF_CITATION,
    );

    (
        CitState {
            relief_applied,
            net_liability,
            ..state
        },
        entry,
    )
}

// Step 8
fn sum_payments_and_credits(
    ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let input = ctx.input;
    let quarters: Vec<Decimal> = input
        .installments_paid
        .iter()
        .map(|amount| round_half_up(*amount))
        .collect();
    let installments_paid: Decimal = quarters.iter().copied().sum();
    let withholding = round_half_up(input.credits.withholding);
    let foreign = round_half_up(input.credits.foreign);
    let credits = withholding + foreign;

    let mut breakdown = state.breakdown;
    for (idx, amount) in quarters.iter().enumerate() {
        if !amount.is_zero() {
            breakdown.push(BreakdownItem {
                category: format!("Q{} installment paid", idx + 1),
                amount: *amount,
                item_type: BreakdownType::Credit,
                citation: INSTALLMENTS_CITATION.to_string(),
            });
        }
    }
    for (category, amount, citation) in [
        (
            "Withholding tax credit",
            withholding,
            WITHHOLDING_CREDIT_CITATION,
        ),
        ("Foreign tax credit", foreign, FOREIGN_CREDIT_CITATION),
    ] {
        if !amount.is_zero() {
            breakdown.push(BreakdownItem {
                category: category.to_string(),
                amount,
                item_type: BreakdownType::Credit,
                citation: citation.to_string(),
            });
        }
    }

    let entry = AuditStep::new(
        "Installments paid and tax credits",
        format!(
            "installments {} + withholding {} + foreign {} = {}",
            fmt_amount(installments_paid),
            fmt_amount(withholding),
            fmt_amount(foreign),
            fmt_amount(installments_paid + credits),
        ),
        installments_paid + credits,
        INSTALLMENTS_CITATION,
    );

    (
        CitState {
            installments_paid,
            credits,
            breakdown,
            ..state
        },
        entry,
    )
}

// Step 9
fn settle_position(
    _ctx: &StepContext<'_>,
    state: CitState,
) -> (CitState, AuditStep) {
    let paid = state.installments_paid + state.credits;
    let net_tax_due = max(state.net_liability - paid, Decimal::ZERO);
    let refund_due = max(paid - state.net_liability, Decimal::ZERO);

    let mut breakdown = state.breakdown;
    if !state.net_liability.is_zero() {
        breakdown.push(BreakdownItem {
            category: "Net corporate tax liability".to_string(),
            amount: state.net_liability,
            item_type: BreakdownType::Liability,
            citation: GROSS_LIABILITY_CITATION.to_string(),
        });
    }

    let entry = AuditStep::new(
        "Final position (positive: tax due, negative: refund due)",
        format!(
            "due = max(0, {net} - {paid}) = {}; refund = max(0, {paid} - {net}) = {}",
            fmt_amount(net_tax_due),
            fmt_amount(refund_due),
            net = fmt_amount(state.net_liability),
            paid = fmt_amount(paid),
        ),
        net_tax_due - refund_due,
        NET_POSITION_CITATION,
    );

    (
        CitState {
            net_tax_due,
            refund_due,
            breakdown,
            ..state
        },
        entry,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        AddBackKind, AddBacks, Deductions, FreeZoneStatus, SmallBusinessRelief, TaxCredits,
    };

    fn test_input() -> CalculationInput {
        CalculationInput {
            entity_id: "ENT-001".to_string(),
            tax_year: 2024,
            accounting_income: dec!(400000.00),
            ..CalculationInput::default()
        }
    }

    fn calculate(input: &CalculationInput) -> CitOutcome {
        let schedule = RateSchedule::uae_2024();
        CitCalculator::new(&schedule).calculate(input)
    }

    // =========================================================================
    // rate precedence tests
    // =========================================================================

    #[test]
    fn standard_rate_charges_only_excess_over_minimum_threshold() {
        let outcome = calculate(&test_input());

        // (400000 - 375000) × 9% = 2250
        assert_eq!(outcome.summary.taxable_income, dec!(400000.00));
        assert_eq!(outcome.summary.rate_basis, RateBasis::StandardRate);
        assert_eq!(outcome.summary.applicable_rate, dec!(0.09));
        assert_eq!(outcome.summary.gross_liability, dec!(2250.00));
        assert_eq!(outcome.summary.net_tax_due, dec!(2250.00));
        assert_eq!(outcome.summary.refund_due, Decimal::ZERO);
    }

    #[test]
    fn below_minimum_threshold_owes_nothing() {
        let mut input = test_input();
        input.accounting_income = dec!(250000.00);

        let outcome = calculate(&input);

        assert_eq!(outcome.summary.rate_basis, RateBasis::BelowMinimumThreshold);
        assert_eq!(outcome.summary.net_tax_due, Decimal::ZERO);
    }

    #[test]
    fn minimum_threshold_is_inclusive() {
        let mut input = test_input();
        input.accounting_income = dec!(375000.00);

        let outcome = calculate(&input);

        assert_eq!(outcome.summary.rate_basis, RateBasis::BelowMinimumThreshold);
    }

    #[test]
    fn qfzp_wins_regardless_of_income() {
        let mut input = test_input();
        input.accounting_income = dec!(2000000.00);
        input.add_backs.non_deductible_expenses = dec!(500000.00);
        input.free_zone = FreeZoneStatus {
            is_free_zone: true,
            qualifying_income: dec!(2000000.00),
            non_qualifying_income: Decimal::ZERO,
            qualifies_for_qfzp: true,
        };

        let outcome = calculate(&input);

        assert_eq!(
            outcome.summary.rate_basis,
            RateBasis::QualifyingFreeZonePerson
        );
        assert_eq!(outcome.summary.applicable_rate, Decimal::ZERO);
        assert_eq!(outcome.summary.net_tax_due, Decimal::ZERO);
    }

    #[test]
    fn qfzp_flag_outside_free_zone_is_ignored() {
        let mut input = test_input();
        input.free_zone.qualifies_for_qfzp = true;

        let outcome = calculate(&input);

        assert_eq!(outcome.summary.rate_basis, RateBasis::StandardRate);
    }

    #[test]
    fn small_business_relief_applies_up_to_relief_threshold() {
        let mut input = test_input();
        input.accounting_income = dec!(3000000.00);
        input.small_business_relief = SmallBusinessRelief {
            qualifies: true,
            relief_amount: Decimal::ZERO,
        };

        let outcome = calculate(&input);

        assert_eq!(outcome.summary.rate_basis, RateBasis::SmallBusinessRelief);
        assert_eq!(outcome.summary.net_tax_due, Decimal::ZERO);
    }

    #[test]
    fn relief_amount_caps_at_gross_liability_above_relief_threshold() {
        let mut input = test_input();
        input.accounting_income = dec!(3375000.00);
        input.small_business_relief = SmallBusinessRelief {
            qualifies: true,
            relief_amount: dec!(500000.00),
        };

        let outcome = calculate(&input);

        // (3375000 - 375000) × 9% = 270000, fully relieved
        assert_eq!(outcome.summary.rate_basis, RateBasis::StandardRate);
        assert_eq!(outcome.summary.gross_liability, dec!(270000.00));
        assert_eq!(outcome.summary.relief_applied, dec!(270000.00));
        assert_eq!(outcome.summary.net_liability, Decimal::ZERO);
    }

    #[test]
    fn partial_relief_reduces_net_liability() {
        let mut input = test_input();
        input.accounting_income = dec!(3375000.00);
        input.small_business_relief = SmallBusinessRelief {
            qualifies: true,
            relief_amount: dec!(20000.00),
        };

        let outcome = calculate(&input);

        assert_eq!(outcome.summary.relief_applied, dec!(20000.00));
        assert_eq!(outcome.summary.net_liability, dec!(250000.00));
    }

    // =========================================================================
    // taxable income tests
    // =========================================================================

    #[test]
    fn loss_floors_taxable_income_at_zero() {
        let mut input = test_input();
        input.accounting_income = dec!(-120000.00);
        input.add_backs.penalties = dec!(20000.00);

        let outcome = calculate(&input);

        assert_eq!(outcome.unfloored_taxable_income, dec!(-100000.00));
        assert_eq!(outcome.summary.taxable_income, Decimal::ZERO);
        assert_eq!(outcome.summary.net_tax_due, Decimal::ZERO);
    }

    #[test]
    fn add_backs_and_deductions_adjust_taxable_income() {
        let mut input = test_input();
        input.add_backs = AddBacks {
            entertainment: dec!(10000.00),
            penalties: dec!(5000.00),
            ..AddBacks::default()
        };
        input.deductions = Deductions {
            carried_forward_losses: dec!(40000.00),
            ..Deductions::default()
        };

        let outcome = calculate(&input);

        assert_eq!(outcome.summary.total_add_backs, dec!(15000.00));
        assert_eq!(outcome.summary.total_deductions, dec!(40000.00));
        assert_eq!(outcome.summary.taxable_income, dec!(375000.00));
        assert_eq!(outcome.summary.net_tax_due, Decimal::ZERO);
    }

    // =========================================================================
    // breakdown tests
    // =========================================================================

    #[test]
    fn breakdown_lists_only_non_zero_items_in_step_order() {
        let mut input = test_input();
        input.add_backs.penalties = dec!(5000.00);
        input.deductions.research_and_development = dec!(1000.00);
        input.installments_paid = [dec!(500.00), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO];
        input.credits = TaxCredits {
            withholding: Decimal::ZERO,
            foreign: dec!(100.00),
        };

        let outcome = calculate(&input);
        let lines: Vec<_> = outcome
            .breakdown
            .iter()
            .map(|item| (item.category.as_str(), item.item_type))
            .collect();

        assert_eq!(
            lines,
            vec![
                ("Fines and penalties", BreakdownType::AddBack),
                ("Research and development", BreakdownType::Deduction),
                ("Q1 installment paid", BreakdownType::Credit),
                ("Foreign tax credit", BreakdownType::Credit),
                ("Net corporate tax liability", BreakdownType::Liability),
            ]
        );
        assert_eq!(
            outcome.breakdown[0].citation,
            AddBackKind::Penalties.citation()
        );
    }

    // =========================================================================
    // final position tests
    // =========================================================================

    #[test]
    fn overpayment_produces_refund() {
        let mut input = test_input();
        input.installments_paid = [dec!(1000.00); 4];

        let outcome = calculate(&input);

        assert_eq!(outcome.summary.installments_paid, dec!(4000.00));
        assert_eq!(outcome.summary.net_tax_due, Decimal::ZERO);
        assert_eq!(outcome.summary.refund_due, dec!(1750.00));
    }

    #[test]
    fn credits_reduce_tax_due() {
        let mut input = test_input();
        input.credits = TaxCredits {
            withholding: dec!(250.00),
            foreign: dec!(1000.00),
        };

        let outcome = calculate(&input);

        assert_eq!(outcome.summary.credits, dec!(1250.00));
        assert_eq!(outcome.summary.net_tax_due, dec!(1000.00));
    }

    // =========================================================================
    // audit trail tests
    // =========================================================================

    #[test]
    fn audit_trail_records_nine_ordered_steps() {
        let outcome = calculate(&test_input());
        let trail = &outcome.audit_trail;

        assert_eq!(trail.len(), 9);
        assert!(trail.is_contiguous());
        assert_eq!(trail.entries()[3].result, dec!(400000.00));
        assert_eq!(
            trail.entries()[5].calculation,
            "(400000.00 - 375000.00) × 9% = 2250.00"
        );
        assert_eq!(trail.last().map(|e| e.result), Some(dec!(2250.00)));
    }

    #[test]
    fn rate_step_cites_schedule_version() {
        let outcome = calculate(&test_input());

        assert!(
            outcome.audit_trail.entries()[4]
                .citation
                .ends_with("(rate schedule UAE-CIT-2024.1)")
        );
    }

    #[test]
    fn refund_position_is_recorded_as_negative_result() {
        let mut input = test_input();
        input.credits.withholding = dec!(3000.00);

        let outcome = calculate(&input);

        assert_eq!(outcome.audit_trail.last().map(|e| e.result), Some(dec!(-750.00)));
    }

    // =========================================================================
    // property tests
    // =========================================================================

    #[test]
    fn due_and_refund_are_never_both_positive() {
        for income in [dec!(-50000), dec!(0), dec!(375000), dec!(400000), dec!(5000000)] {
            for paid in [dec!(0), dec!(1000), dec!(2250), dec!(1000000)] {
                let mut input = test_input();
                input.accounting_income = income;
                input.installments_paid[0] = paid;

                let summary = calculate(&input).summary;

                assert_eq!(summary.net_tax_due * summary.refund_due, Decimal::ZERO);
                assert!(summary.taxable_income >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn increasing_an_add_back_never_decreases_tax_due() {
        let mut previous = Decimal::ZERO;
        for step in 0..40 {
            let mut input = test_input();
            input.accounting_income = dec!(300000.00);
            input.small_business_relief.qualifies = true;
            input.add_backs.related_party_expense = Decimal::from(step) * dec!(100000);

            let due = calculate(&input).summary.net_tax_due;

            assert!(due >= previous, "tax due fell from {previous} to {due}");
            previous = due;
        }
    }

    #[test]
    fn calculation_is_repeatable() {
        let mut input = test_input();
        input.add_backs.entertainment = dec!(1234.56);
        input.credits.foreign = dec!(99.99);

        assert_eq!(calculate(&input), calculate(&input));
    }
}
