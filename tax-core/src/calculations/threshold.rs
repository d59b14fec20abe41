//! Revenue projection and threshold proximity alerts.
//!
//! Three independent rules may fire together:
//!
//! | Alert | Fires when | Action required |
//! |-------|------------|-----------------|
//! | VAT registration | 80% ≤ current revenue / VAT threshold < 100% | yes |
//! | Audit requirement | projected annual revenue > 70% of the audit threshold | no |
//! | Accrual accounting | lower bound < current revenue < upper bound | yes |
//!
//! Projection is a straight-line extrapolation:
//! `projected = current × 12 / elapsed_months`, with `elapsed_months`
//! clamped to at least one.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::calculations::common::{fmt_amount, percent_of, round_half_up};
use crate::models::{
    RateSchedule, ThresholdAlert, ThresholdKind, ThresholdProgress, ThresholdSnapshot,
};

/// Days per month used for the average daily run rate.
const DAYS_PER_MONTH: u32 = 30;

#[derive(Debug, Clone)]
pub struct ThresholdMonitor<'a> {
    schedule: &'a RateSchedule,
}

impl<'a> ThresholdMonitor<'a> {
    pub fn new(schedule: &'a RateSchedule) -> Self {
        Self { schedule }
    }

    /// Projects annual revenue and generates every applicable alert.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::ThresholdMonitor;
    /// use tax_core::{RateSchedule, ThresholdKind};
    ///
    /// let schedule = RateSchedule::uae_2024();
    /// let snapshot = ThresholdMonitor::new(&schedule).project(dec!(320000), 8);
    ///
    /// assert_eq!(snapshot.projected_annual_revenue, dec!(480000));
    /// assert!(snapshot.alert(ThresholdKind::VatRegistration).is_some());
    /// ```
    pub fn project(
        &self,
        current_revenue: Decimal,
        elapsed_months: u32,
    ) -> ThresholdSnapshot {
        let months = elapsed_months.max(1);
        let projected_annual_revenue =
            round_half_up(current_revenue * Decimal::from(12) / Decimal::from(months));
        let average_daily_revenue =
            current_revenue / (Decimal::from(months) * Decimal::from(DAYS_PER_MONTH));

        let thresholds = [
            (
                ThresholdKind::VatRegistration,
                self.schedule.vat_registration_threshold,
            ),
            (ThresholdKind::AuditRequirement, self.schedule.audit_threshold),
            (
                ThresholdKind::AccrualAccounting,
                self.schedule.accrual_basis_upper,
            ),
        ]
        .into_iter()
        .map(|(kind, threshold)| ThresholdProgress {
            kind,
            threshold,
            progress_pct: percent_of(current_revenue, threshold),
        })
        .collect();

        let alerts = [
            self.vat_registration_alert(current_revenue, average_daily_revenue),
            self.audit_alert(
                current_revenue,
                projected_annual_revenue,
                average_daily_revenue,
            ),
            self.accrual_alert(current_revenue, average_daily_revenue),
        ]
        .into_iter()
        .flatten()
        .collect();

        ThresholdSnapshot {
            current_revenue,
            elapsed_months: months,
            projected_annual_revenue,
            thresholds,
            alerts,
        }
    }

    fn vat_registration_alert(
        &self,
        current_revenue: Decimal,
        average_daily_revenue: Decimal,
    ) -> Option<ThresholdAlert> {
        let threshold = self.schedule.vat_registration_threshold;
        let alert_floor = threshold * self.schedule.vat_alert_ratio;
        if current_revenue < alert_floor || current_revenue >= threshold {
            return None;
        }

        Some(ThresholdAlert {
            kind: ThresholdKind::VatRegistration,
            message: format!(
                "Revenue of AED {} is {}% of the VAT registration threshold of AED {}; prepare to register",
                fmt_amount(current_revenue),
                percent_of(current_revenue, threshold),
                fmt_amount(threshold),
            ),
            days_to_threshold: days_to_threshold(threshold, current_revenue, average_daily_revenue),
            action_required: true,
        })
    }

    fn audit_alert(
        &self,
        current_revenue: Decimal,
        projected_annual_revenue: Decimal,
        average_daily_revenue: Decimal,
    ) -> Option<ThresholdAlert> {
        let threshold = self.schedule.audit_threshold;
        if projected_annual_revenue <= threshold * self.schedule.audit_alert_ratio {
            return None;
        }

        Some(ThresholdAlert {
            kind: ThresholdKind::AuditRequirement,
            message: format!(
                "Projected annual revenue of AED {} approaches the AED {} audited financial statements threshold",
                fmt_amount(projected_annual_revenue),
                fmt_amount(threshold),
            ),
            days_to_threshold: days_to_threshold(threshold, current_revenue, average_daily_revenue),
            action_required: false,
        })
    }

    fn accrual_alert(
        &self,
        current_revenue: Decimal,
        average_daily_revenue: Decimal,
    ) -> Option<ThresholdAlert> {
        let lower = self.schedule.accrual_basis_lower;
        let upper = self.schedule.accrual_basis_upper;
        if current_revenue <= lower || current_revenue >= upper {
            return None;
        }

        Some(ThresholdAlert {
            kind: ThresholdKind::AccrualAccounting,
            message: format!(
                "Revenue of AED {} is approaching AED {}; prepare to switch from cash to accrual accounting",
                fmt_amount(current_revenue),
                fmt_amount(upper),
            ),
            days_to_threshold: days_to_threshold(upper, current_revenue, average_daily_revenue),
            action_required: true,
        })
    }
}

/// `ceil((threshold − current) / average_daily_revenue)`, zero once crossed.
fn days_to_threshold(
    threshold: Decimal,
    current_revenue: Decimal,
    average_daily_revenue: Decimal,
) -> Option<u32> {
    if current_revenue >= threshold {
        return Some(0);
    }
    if average_daily_revenue <= Decimal::ZERO {
        return None;
    }
    (threshold - current_revenue)
        .checked_div(average_daily_revenue)
        .and_then(|days| days.ceil().to_u32())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn kinds(snapshot: &ThresholdSnapshot) -> Vec<ThresholdKind> {
        snapshot.alerts.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn project_extrapolates_linearly() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        let snapshot = monitor.project(dec!(150000), 6);

        assert_eq!(snapshot.projected_annual_revenue, dec!(300000));
        assert!(snapshot.alerts.is_empty());
    }

    #[test]
    fn project_clamps_zero_months_to_one() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        let snapshot = monitor.project(dec!(10000), 0);

        assert_eq!(snapshot.elapsed_months, 1);
        assert_eq!(snapshot.projected_annual_revenue, dec!(120000));
    }

    #[test]
    fn project_handles_extreme_elapsed_months() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        let snapshot = monitor.project(dec!(1000), u32::MAX);

        assert_eq!(snapshot.elapsed_months, u32::MAX);
        assert_eq!(snapshot.projected_annual_revenue, Decimal::ZERO);
        assert!(snapshot.alert(ThresholdKind::VatRegistration).is_none());
    }

    #[test]
    fn vat_alert_fires_at_eighty_percent() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        let snapshot = monitor.project(dec!(300000), 10);
        let alert = snapshot.alert(ThresholdKind::VatRegistration).unwrap();

        // Daily rate: 300000 / 300 = 1000; remaining 75000 → 75 days
        assert!(alert.action_required);
        assert_eq!(alert.days_to_threshold, Some(75));
    }

    #[test]
    fn vat_alert_silent_below_eighty_percent_and_once_crossed() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        assert!(
            monitor
                .project(dec!(299999.99), 10)
                .alert(ThresholdKind::VatRegistration)
                .is_none()
        );
        assert!(
            monitor
                .project(dec!(375000), 10)
                .alert(ThresholdKind::VatRegistration)
                .is_none()
        );
    }

    #[test]
    fn audit_alert_is_informational() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        // Projected: 18M × 12 / 6 = 36M > 35M
        let snapshot = monitor.project(dec!(18000000), 6);
        let alert = snapshot.alert(ThresholdKind::AuditRequirement).unwrap();

        assert!(!alert.action_required);
        assert_eq!(snapshot.projected_annual_revenue, dec!(36000000));
    }

    #[test]
    fn accrual_alert_fires_strictly_inside_band() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        assert!(
            monitor
                .project(dec!(2500000), 12)
                .alert(ThresholdKind::AccrualAccounting)
                .is_none()
        );
        let alert = monitor
            .project(dec!(2700000), 12)
            .alert(ThresholdKind::AccrualAccounting)
            .cloned()
            .unwrap();
        assert!(alert.action_required);
    }

    #[test]
    fn alerts_co_fire_independently() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        // 2.7M in one month projects to 32.4M (below 35M), so audit stays quiet
        let snapshot = monitor.project(dec!(2700000), 1);
        assert_eq!(kinds(&snapshot), vec![ThresholdKind::AccrualAccounting]);

        let mut schedule = RateSchedule::uae_2024();
        schedule.audit_threshold = dec!(4000000);
        let monitor = ThresholdMonitor::new(&schedule);
        let snapshot = monitor.project(dec!(2700000), 6);
        assert_eq!(
            kinds(&snapshot),
            vec![
                ThresholdKind::AuditRequirement,
                ThresholdKind::AccrualAccounting,
            ]
        );
    }

    #[test]
    fn progress_reported_for_every_threshold() {
        let schedule = RateSchedule::uae_2024();
        let monitor = ThresholdMonitor::new(&schedule);

        let snapshot = monitor.project(dec!(187500), 6);
        let progress: Vec<_> = snapshot
            .thresholds
            .iter()
            .map(|p| (p.kind, p.progress_pct))
            .collect();

        assert_eq!(
            progress,
            vec![
                (ThresholdKind::VatRegistration, dec!(50)),
                (ThresholdKind::AuditRequirement, dec!(0.38)),
                (ThresholdKind::AccrualAccounting, dec!(6.25)),
            ]
        );
    }

    #[test]
    fn days_to_threshold_without_revenue_is_unknown() {
        assert_eq!(days_to_threshold(dec!(100), Decimal::ZERO, Decimal::ZERO), None);
    }

    #[test]
    fn days_to_threshold_beyond_representable_range_is_unknown() {
        let days = days_to_threshold(dec!(375000), dec!(1), dec!(0.0000000000000000000000000001));

        assert_eq!(days, None);
    }
}
