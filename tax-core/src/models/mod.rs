mod audit_trail;
mod calculation_input;
mod calculation_result;
mod eligibility;
mod rate_schedule;
mod threshold;
mod vat;

pub use audit_trail::{AuditTrail, AuditTrailEntry};
pub use calculation_input::{
    AddBackKind, AddBacks, CalculationInput, DeductionKind, Deductions, FIRST_TAX_YEAR,
    FreeZoneStatus, LAST_TAX_YEAR, QfzpProfile, RevenueToDate, SmallBusinessRelief, TaxCredits,
};
pub use calculation_result::{
    BreakdownItem, BreakdownType, CalculationResult, CalculationSummary, ComplianceCheck,
    FilingRequirements, InstallmentScheduleEntry, InstallmentStatus, RateBasis,
};
pub use eligibility::{
    ActivityTestOutcome, EligibilityAssessment, IncomeTestOutcome, ManagementTestOutcome,
    OwnershipTestOutcome,
};
pub use rate_schedule::{RateSchedule, RateScheduleRecord};
pub use threshold::{ThresholdAlert, ThresholdKind, ThresholdProgress, ThresholdSnapshot};
pub use vat::{VatCalculation, VatInput};
