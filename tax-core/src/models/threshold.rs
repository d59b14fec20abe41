use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Regulatory revenue thresholds watched by the threshold monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdKind {
    VatRegistration,
    AuditRequirement,
    AccrualAccounting,
}

impl ThresholdKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::VatRegistration => "VAT registration",
            Self::AuditRequirement => "Audited financial statements",
            Self::AccrualAccounting => "Accrual basis of accounting",
        }
    }
}

/// Progress of current revenue toward one threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdProgress {
    pub kind: ThresholdKind,
    pub threshold: Decimal,
    /// `current_revenue / threshold * 100`, rounded to two places.
    pub progress_pct: Decimal,
}

/// A generated proximity alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdAlert {
    pub kind: ThresholdKind,
    pub message: String,
    /// Estimated days until current revenue reaches the threshold at the
    /// average daily run rate. `None` when there is no run rate.
    pub days_to_threshold: Option<u32>,
    pub action_required: bool,
}

/// Point-in-time revenue projection against every threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSnapshot {
    pub current_revenue: Decimal,
    /// Elapsed months after clamping to at least one.
    pub elapsed_months: u32,
    pub projected_annual_revenue: Decimal,
    pub thresholds: Vec<ThresholdProgress>,
    pub alerts: Vec<ThresholdAlert>,
}

impl ThresholdSnapshot {
    pub fn alert(
        &self,
        kind: ThresholdKind,
    ) -> Option<&ThresholdAlert> {
        self.alerts.iter().find(|alert| alert.kind == kind)
    }
}
