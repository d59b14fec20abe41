//! Rule engine components.
//!
//! Each calculator borrows a validated [`RateSchedule`](crate::RateSchedule)
//! and is otherwise stateless, so one schedule can back any number of
//! concurrent calculations.

pub mod audit_trail;
pub mod cit;
pub mod common;
pub mod compliance;
pub mod eligibility;
pub mod filing_schedule;
pub mod threshold;
pub mod vat;

pub use audit_trail::{AuditStep, AuditTrailRecorder};
pub use cit::{CitCalculator, CitOutcome};
pub use compliance::ComplianceReviewer;
pub use eligibility::{EligibilityAssessor, ExcludedActivity, QualifyingActivity};
pub use filing_schedule::{FilingScheduleGenerator, REQUIRED_DOCUMENTS};
pub use threshold::ThresholdMonitor;
pub use vat::VatCalculator;
