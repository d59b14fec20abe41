use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One recorded calculation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrailEntry {
    /// 1-based position in the trail.
    pub step: u32,
    pub description: String,
    /// The arithmetic performed, as a formatted expression.
    pub calculation: String,
    pub result: Decimal,
    pub citation: String,
}

/// An ordered, append-only ledger of calculation steps.
///
/// Entries can only be added through
/// [`AuditTrailRecorder`](crate::calculations::AuditTrailRecorder); there is
/// no way to edit or remove one once recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail {
    entries: Vec<AuditTrailEntry>,
}

impl AuditTrail {
    pub(crate) fn from_entries(entries: Vec<AuditTrailEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AuditTrailEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuditTrailEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&AuditTrailEntry> {
        self.entries.last()
    }

    /// True when steps are numbered 1, 2, 3, ... with no gaps.
    pub fn is_contiguous(&self) -> bool {
        self.entries
            .iter()
            .zip(1u32..)
            .all(|(entry, expected)| entry.step == expected)
    }
}

impl<'a> IntoIterator for &'a AuditTrail {
    type Item = &'a AuditTrailEntry;
    type IntoIter = std::slice::Iter<'a, AuditTrailEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
