use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of the qualifying-income test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTestOutcome {
    pub passed: bool,
    pub qualifying_income: Decimal,
    pub excluded_income: Decimal,
    /// Qualifying share of total income, 0..=100.
    pub qualifying_income_pct: Decimal,
    pub minimum_pct: Decimal,
    pub income_cap: Decimal,
}

/// Outcome of the activity test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTestOutcome {
    pub passed: bool,
    pub declared: Vec<String>,
    /// Declared activities found in the qualifying catalogue (canonical names).
    pub qualifying: Vec<String>,
    /// Declared activities found in the excluded catalogue (canonical names).
    pub excluded: Vec<String>,
}

/// Outcome of the management and control test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementTestOutcome {
    pub passed: bool,
    pub has_adequate_substance: bool,
    pub is_uae_controlled: bool,
}

/// Outcome of the ownership test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTestOutcome {
    pub passed: bool,
    pub natural_person_ownership_pct: Decimal,
    pub minimum_pct: Decimal,
}

/// Result of assessing a free-zone entity against the four QFZP tests.
///
/// Derived fresh on every call; never stored independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityAssessment {
    pub income: IncomeTestOutcome,
    pub activity: ActivityTestOutcome,
    pub management: ManagementTestOutcome,
    pub ownership: OwnershipTestOutcome,

    /// `passed_count / 4 * 100`.
    pub score: Decimal,

    /// True only when all four tests pass.
    pub is_eligible: bool,

    pub recommendations: Vec<String>,
}

impl EligibilityAssessment {
    /// Number of tests that passed.
    pub fn passed_count(&self) -> usize {
        [
            self.income.passed,
            self.activity.passed,
            self.management.passed,
            self.ownership.passed,
        ]
        .into_iter()
        .filter(|passed| *passed)
        .count()
    }
}
