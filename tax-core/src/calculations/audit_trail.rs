//! Append-only recording of calculation steps.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{AuditTrail, AuditTrailEntry};

/// A calculation step awaiting its position in the trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStep {
    pub description: String,
    pub calculation: String,
    pub result: Decimal,
    pub citation: String,
}

impl AuditStep {
    pub fn new(
        description: impl Into<String>,
        calculation: impl Into<String>,
        result: Decimal,
        citation: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            calculation: calculation.into(),
            result,
            citation: citation.into(),
        }
    }
}

/// Numbers steps in the order they are recorded and seals them into an
/// [`AuditTrail`].
#[derive(Debug, Default)]
pub struct AuditTrailRecorder {
    entries: Vec<AuditTrailEntry>,
}

impl AuditTrailRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step and returns its assigned step number.
    pub fn record(
        &mut self,
        step: AuditStep,
    ) -> u32 {
        let number = self.next_step();
        debug!(
            step = number,
            description = %step.description,
            calculation = %step.calculation,
            result = %step.result,
            "audit step recorded"
        );
        self.entries.push(AuditTrailEntry {
            step: number,
            description: step.description,
            calculation: step.calculation,
            result: step.result,
            citation: step.citation,
        });
        number
    }

    /// Number the next recorded step will receive.
    pub fn next_step(&self) -> u32 {
        u32::try_from(self.entries.len()).map_or(u32::MAX, |len| len.saturating_add(1))
    }

    pub fn finish(self) -> AuditTrail {
        AuditTrail::from_entries(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn record_numbers_steps_from_one() {
        let mut recorder = AuditTrailRecorder::new();

        let first = recorder.record(AuditStep::new("a", "1 + 1", dec!(2), "cite"));
        let second = recorder.record(AuditStep::new("b", "2 × 2", dec!(4), "cite"));

        assert_eq!((first, second), (1, 2));
    }

    #[test]
    fn finish_preserves_recording_order() {
        let mut recorder = AuditTrailRecorder::new();
        recorder.record(AuditStep::new("first", "x", dec!(1), "c1"));
        recorder.record(AuditStep::new("second", "y", dec!(2), "c2"));

        let trail = recorder.finish();
        let descriptions: Vec<_> = trail.iter().map(|e| e.description.as_str()).collect();

        assert_eq!(descriptions, vec!["first", "second"]);
        assert!(trail.is_contiguous());
    }

    #[test]
    fn empty_recorder_yields_empty_trail() {
        let trail = AuditTrailRecorder::new().finish();

        assert!(trail.is_empty());
        assert!(trail.is_contiguous());
    }
}
