//! Integration tests that load the on-disk fixtures and run them through
//! the engine end to end.

use std::fs::File;
use std::path::PathBuf;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_core::{InMemoryRateScheduleRepository, RateBasis, RateScheduleRepository};
use tax_data::{BatchOutcome, RateScheduleLoader, input_loader, run_batch};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

async fn setup_repo() -> InMemoryRateScheduleRepository {
    let file = File::open(fixture_path("rate_schedules.csv")).expect("fixture should open");
    let schedules = RateScheduleLoader::parse(file).expect("Failed to parse rate schedules");
    let repo = InMemoryRateScheduleRepository::new();
    RateScheduleLoader::load(&repo, &schedules)
        .await
        .expect("Failed to load rate schedules");
    repo
}

async fn run_fixture_batch() -> BatchOutcome {
    let repo = setup_repo().await;
    let inputs = input_loader::load_from_file(&fixture_path("inputs.csv"))
        .expect("fixture inputs should load");

    run_batch(&repo, &inputs, None, as_of())
        .await
        .expect("batch should complete")
}

#[tokio::test]
async fn test_load_fixture_schedules() {
    let repo = setup_repo().await;

    let versions = repo.list_versions().await.unwrap();

    assert_eq!(versions, vec!["UAE-CIT-2024.1", "UAE-CIT-2026.1"]);
}

#[tokio::test]
async fn test_fixture_batch_rejects_invalid_row() {
    let outcome = run_fixture_batch().await;

    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].entity_id, "ENT-004");
    assert_eq!(outcome.rejected[0].errors[0].field, "add_backs.entertainment");
}

#[tokio::test]
async fn test_fixture_standard_rate_entity() {
    let outcome = run_fixture_batch().await;
    let result = &outcome.results[0];

    assert_eq!(result.entity_id, "ENT-001");
    assert_eq!(result.summary.net_tax_due, dec!(2250.00));
    assert_eq!(result.audit_trail.len(), 9);
    assert_eq!(result.filing.installment_schedule.len(), 4);
}

#[tokio::test]
async fn test_fixture_loss_entity() {
    let outcome = run_fixture_batch().await;
    let result = &outcome.results[1];

    assert_eq!(result.entity_id, "ENT-002");
    assert_eq!(result.summary.taxable_income, Decimal::ZERO);
    assert!(result.compliance.loss_carry_forward_available);
    assert!(
        result
            .compliance
            .warnings
            .iter()
            .any(|w| w.contains("95000.00"))
    );
    assert!(
        result
            .compliance
            .requirements
            .iter()
            .any(|r| r.contains("transfer pricing"))
    );
}

#[tokio::test]
async fn test_fixture_free_zone_entity() {
    let outcome = run_fixture_batch().await;
    let result = &outcome.results[2];

    assert_eq!(
        result.summary.rate_basis,
        RateBasis::QualifyingFreeZonePerson
    );
    assert_eq!(result.summary.net_tax_due, Decimal::ZERO);

    let eligibility = result.eligibility.as_ref().expect("profile attached");
    assert_eq!(eligibility.score, dec!(75));
    assert!(!eligibility.is_eligible);
    assert!(
        result
            .compliance
            .warnings
            .iter()
            .any(|w| w.starts_with("QFZP status is declared"))
    );
    assert!(result.threshold_snapshot.is_some());
}

#[tokio::test]
async fn test_fixture_later_year_uses_later_schedule() {
    let outcome = run_fixture_batch().await;
    let result = &outcome.results[3];

    // (1,375,000 - 375,000) × 9% = 90,000 against 125,000 paid
    assert_eq!(result.rate_schedule_version, "UAE-CIT-2026.1");
    assert_eq!(result.summary.net_liability, dec!(90000.00));
    assert_eq!(result.summary.refund_due, dec!(35000.00));
    assert_eq!(result.summary.net_tax_due, Decimal::ZERO);
}

#[tokio::test]
async fn test_fixture_batch_serialises_to_json() {
    let outcome = run_fixture_batch().await;

    let json = serde_json::to_value(&outcome).expect("outcome should serialise");

    assert_eq!(json["results"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["rejected"][0]["entity_id"], "ENT-004");
}
