//! Qualifying Free Zone Person (QFZP) eligibility assessment.
//!
//! An entity is eligible only when all four independent tests pass:
//!
//! | Test | Passes when |
//! |------|-------------|
//! | Income | qualifying share ≥ 90% **and** qualifying income ≤ the QFZP income cap |
//! | Activity | at least one qualifying activity and no excluded activity |
//! | Management | adequate substance **and** controlled from the UAE |
//! | Ownership | natural persons hold ≥ 50% |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::EligibilityAssessor;
//! use tax_core::{QfzpProfile, RateSchedule};
//!
//! let schedule = RateSchedule::uae_2024();
//! let profile = QfzpProfile {
//!     qualifying_income: dec!(200000),
//!     excluded_income: dec!(10000),
//!     activities: vec!["Trading".to_string(), "banking".to_string()],
//!     has_adequate_substance: true,
//!     is_uae_controlled: true,
//!     natural_person_ownership_pct: dec!(60),
//! };
//!
//! let assessment = EligibilityAssessor::new(&schedule).assess(&profile);
//!
//! assert!(assessment.income.passed);
//! assert!(!assessment.activity.passed);
//! assert_eq!(assessment.score, dec!(75));
//! assert!(!assessment.is_eligible);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{percent_of, round_half_up};
use crate::models::{
    ActivityTestOutcome, EligibilityAssessment, IncomeTestOutcome, ManagementTestOutcome,
    OwnershipTestOutcome, QfzpProfile, RateSchedule,
};

/// Activities that can generate qualifying income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifyingActivity {
    Trading,
    Distribution,
    Logistics,
    Manufacturing,
    Holding,
    Treasury,
    Financing,
    Leasing,
}

impl QualifyingActivity {
    pub const ALL: [QualifyingActivity; 8] = [
        QualifyingActivity::Trading,
        QualifyingActivity::Distribution,
        QualifyingActivity::Logistics,
        QualifyingActivity::Manufacturing,
        QualifyingActivity::Holding,
        QualifyingActivity::Treasury,
        QualifyingActivity::Financing,
        QualifyingActivity::Leasing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trading => "trading",
            Self::Distribution => "distribution",
            Self::Logistics => "logistics",
            Self::Manufacturing => "manufacturing",
            Self::Holding => "holding",
            Self::Treasury => "treasury",
            Self::Financing => "financing",
            Self::Leasing => "leasing",
        }
    }

    /// Case-insensitive exact match against the catalogue.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|activity| activity.as_str().eq_ignore_ascii_case(s))
    }
}

/// Activities that disqualify an entity outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcludedActivity {
    Banking,
    Insurance,
    InvestmentFundManagement,
    RealEstate,
}

impl ExcludedActivity {
    pub const ALL: [ExcludedActivity; 4] = [
        ExcludedActivity::Banking,
        ExcludedActivity::Insurance,
        ExcludedActivity::InvestmentFundManagement,
        ExcludedActivity::RealEstate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Banking => "banking",
            Self::Insurance => "insurance",
            Self::InvestmentFundManagement => "investment fund management",
            Self::RealEstate => "real estate",
        }
    }

    /// Case-insensitive exact match against the catalogue.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|activity| activity.as_str().eq_ignore_ascii_case(s))
    }
}

const INCOME_TEST_RECOMMENDATION: &str = "Raise qualifying income to at least the minimum share of total income and keep it within the QFZP qualifying income cap";
const ACTIVITY_TEST_RECOMMENDATION: &str = "Restrict operations to qualifying activities and discontinue excluded activities (banking, insurance, investment fund management, real estate)";
const MANAGEMENT_TEST_RECOMMENDATION: &str = "Demonstrate adequate substance in the free zone with core income-generating activities managed and controlled in the UAE";
const OWNERSHIP_TEST_RECOMMENDATION: &str = "Review the shareholding structure so natural persons hold at least the minimum ownership share";

/// Reminders appended to every assessment regardless of outcome.
pub const STANDING_RECOMMENDATIONS: [&str; 3] = [
    "Maintain complete records separating qualifying and non-qualifying income",
    "Prepare annual substance documentation for the free zone authority",
    "Review QFZP status quarterly",
];

/// Runs the four QFZP tests against a [`RateSchedule`].
#[derive(Debug, Clone)]
pub struct EligibilityAssessor<'a> {
    schedule: &'a RateSchedule,
}

impl<'a> EligibilityAssessor<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self { schedule }
    }

    /// Assesses a free-zone profile. Pure and deterministic.
    pub fn assess(
        &self,
        profile: &QfzpProfile,
    ) -> EligibilityAssessment {
        let income = self.income_test(profile);
        let activity = self.activity_test(&profile.activities);
        let management = self.management_test(profile);
        let ownership = self.ownership_test(profile.natural_person_ownership_pct);

        let mut recommendations = Vec::new();
        if !income.passed {
            recommendations.push(INCOME_TEST_RECOMMENDATION.to_string());
        }
        if !activity.passed {
            recommendations.push(ACTIVITY_TEST_RECOMMENDATION.to_string());
        }
        if !management.passed {
            recommendations.push(MANAGEMENT_TEST_RECOMMENDATION.to_string());
        }
        if !ownership.passed {
            recommendations.push(OWNERSHIP_TEST_RECOMMENDATION.to_string());
        }
        recommendations.extend(STANDING_RECOMMENDATIONS.iter().map(|r| r.to_string()));

        let mut assessment = EligibilityAssessment {
            income,
            activity,
            management,
            ownership,
            score: Decimal::ZERO,
            is_eligible: false,
            recommendations,
        };
        let passed = assessment.passed_count();
        assessment.score = self.score(passed);
        assessment.is_eligible = passed == 4;
        assessment
    }

    /// Qualifying share and absolute cap must both hold. The share is
    /// compared unrounded; the rounded percentage is reported only.
    fn income_test(
        &self,
        profile: &QfzpProfile,
    ) -> IncomeTestOutcome {
        let total = profile.qualifying_income + profile.excluded_income;
        let qualifying_income_pct = percent_of(profile.qualifying_income, total);
        let meets_share = total > Decimal::ZERO
            && profile.qualifying_income * Decimal::ONE_HUNDRED
                >= self.schedule.qfzp_min_qualifying_income_pct * total;
        let passed = meets_share && profile.qualifying_income <= self.schedule.qfzp_income_cap;

        IncomeTestOutcome {
            passed,
            qualifying_income: profile.qualifying_income,
            excluded_income: profile.excluded_income,
            qualifying_income_pct,
            minimum_pct: self.schedule.qfzp_min_qualifying_income_pct,
            income_cap: self.schedule.qfzp_income_cap,
        }
    }

    fn activity_test(
        &self,
        declared: &[String],
    ) -> ActivityTestOutcome {
        let qualifying: Vec<String> = declared
            .iter()
            .filter_map(|a| QualifyingActivity::parse(a))
            .map(|a| a.as_str().to_string())
            .collect();
        let excluded: Vec<String> = declared
            .iter()
            .filter_map(|a| ExcludedActivity::parse(a))
            .map(|a| a.as_str().to_string())
            .collect();

        ActivityTestOutcome {
            passed: !qualifying.is_empty() && excluded.is_empty(),
            declared: declared.to_vec(),
            qualifying,
            excluded,
        }
    }

    fn management_test(
        &self,
        profile: &QfzpProfile,
    ) -> ManagementTestOutcome {
        ManagementTestOutcome {
            passed: profile.has_adequate_substance && profile.is_uae_controlled,
            has_adequate_substance: profile.has_adequate_substance,
            is_uae_controlled: profile.is_uae_controlled,
        }
    }

    fn ownership_test(
        &self,
        natural_person_ownership_pct: Decimal,
    ) -> OwnershipTestOutcome {
        OwnershipTestOutcome {
            passed: natural_person_ownership_pct
                >= self.schedule.qfzp_min_natural_person_ownership_pct,
            natural_person_ownership_pct,
            minimum_pct: self.schedule.qfzp_min_natural_person_ownership_pct,
        }
    }

    fn score(
        &self,
        passed: usize,
    ) -> Decimal {
        round_half_up(Decimal::from(passed) / Decimal::from(4) * Decimal::ONE_HUNDRED)
    }
}
