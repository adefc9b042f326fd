use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use uuid::Uuid;

use doctor_cell::models::{Availability, DoctorError, ScheduleStatus};
use doctor_cell::repository::{InMemoryScheduleRepository, ScheduleRepository};
use doctor_cell::services::{AvailabilityResolver, ScheduleService};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> (Arc<InMemoryScheduleRepository>, ScheduleService, AvailabilityResolver) {
    let repository = Arc::new(InMemoryScheduleRepository::new());
    let schedules = ScheduleService::new(repository.clone(), 90);
    let resolver = AvailabilityResolver::new(repository.clone());
    (repository, schedules, resolver)
}

#[tokio::test]
async fn doctor_without_entries_is_available() {
    let (_, _, resolver) = setup();

    let availability = resolver.is_available(Uuid::new_v4(), date("2025-06-01")).await.unwrap();

    assert_eq!(availability, Availability::available());
}

#[tokio::test]
async fn duty_entry_is_available_and_leave_entry_is_not() {
    let (_, schedules, resolver) = setup();
    let doctor_id = Uuid::new_v4();

    tokio_test::assert_ok!(schedules.set_schedule(doctor_id, date("2025-06-01"), ScheduleStatus::Duty, None).await);
    tokio_test::assert_ok!(
        schedules
            .set_schedule(doctor_id, date("2025-06-02"), ScheduleStatus::Leave, Some("conference".to_string()))
            .await
    );

    assert!(resolver.is_available(doctor_id, date("2025-06-01")).await.unwrap().available);

    let leave = resolver.is_available(doctor_id, date("2025-06-02")).await.unwrap();
    assert!(!leave.available);
    assert_eq!(leave.reason.as_deref(), Some("conference"));
}

#[tokio::test]
async fn leave_without_reason_is_still_unavailable() {
    let (_, schedules, resolver) = setup();
    let doctor_id = Uuid::new_v4();

    schedules.set_schedule(doctor_id, date("2025-06-03"), ScheduleStatus::Leave, Some("  ".to_string())).await.unwrap();

    let availability = resolver.is_available(doctor_id, date("2025-06-03")).await.unwrap();
    assert_eq!(availability, Availability::on_leave(None));
}

#[tokio::test]
async fn repeated_set_schedule_leaves_single_entry() {
    let (repository, schedules, _) = setup();
    let doctor_id = Uuid::new_v4();
    let day = date("2025-06-10");

    let first = schedules.set_schedule(doctor_id, day, ScheduleStatus::Leave, Some("flu".to_string())).await.unwrap();
    let second = schedules.set_schedule(doctor_id, day, ScheduleStatus::Leave, Some("flu".to_string())).await.unwrap();

    assert_eq!(repository.len().await, 1);
    assert_eq!(first.schedule_id, second.schedule_id);

    let stored = repository.find(doctor_id, day).await.unwrap().unwrap();
    assert_eq!(stored.status, ScheduleStatus::Leave);
    assert_eq!(stored.reason.as_deref(), Some("flu"));
}

#[tokio::test]
async fn last_write_wins_and_duty_clears_reason() {
    let (repository, schedules, resolver) = setup();
    let doctor_id = Uuid::new_v4();
    let day = date("2025-06-11");

    schedules.set_schedule(doctor_id, day, ScheduleStatus::Leave, Some("flu".to_string())).await.unwrap();
    schedules.set_schedule(doctor_id, day, ScheduleStatus::Duty, Some("ignored".to_string())).await.unwrap();

    let stored = repository.find(doctor_id, day).await.unwrap().unwrap();
    assert_eq!(stored.status, ScheduleStatus::Duty);
    assert_eq!(stored.reason, None);
    assert!(resolver.is_available(doctor_id, day).await.unwrap().available);
}

#[tokio::test]
async fn range_is_ordered_inclusive_and_scoped_to_doctor() {
    let (_, schedules, _) = setup();
    let doctor_id = Uuid::new_v4();
    let other_doctor = Uuid::new_v4();

    for day in ["2025-06-20", "2025-06-05", "2025-06-12", "2025-07-01"] {
        schedules.set_schedule(doctor_id, date(day), ScheduleStatus::Leave, None).await.unwrap();
    }
    schedules.set_schedule(other_doctor, date("2025-06-06"), ScheduleStatus::Leave, None).await.unwrap();

    let entries = schedules.get_range(doctor_id, date("2025-06-05"), date("2025-06-20")).await.unwrap();
    let days: Vec<NaiveDate> = entries.iter().map(|e| e.schedule_date).collect();

    assert_eq!(days, vec![date("2025-06-05"), date("2025-06-12"), date("2025-06-20")]);
    assert!(entries.iter().all(|e| e.doctor_id == doctor_id));
}

#[tokio::test]
async fn range_rejects_inverted_or_oversized_windows() {
    let (_, schedules, _) = setup();
    let doctor_id = Uuid::new_v4();

    assert_matches!(
        schedules.get_range(doctor_id, date("2025-06-10"), date("2025-06-01")).await,
        Err(DoctorError::ValidationError(_))
    );
    assert_matches!(
        schedules.get_range(doctor_id, date("2025-01-01"), date("2025-12-31")).await,
        Err(DoctorError::ValidationError(_))
    );
}

#[tokio::test]
async fn calendar_fills_implied_duty_days() {
    let (_, schedules, _) = setup();
    let doctor_id = Uuid::new_v4();

    schedules
        .set_schedule(doctor_id, date("2025-06-03"), ScheduleStatus::Leave, Some("training".to_string()))
        .await
        .unwrap();

    let grid = schedules.calendar(doctor_id, date("2025-06-01"), 30).await.unwrap();

    assert_eq!(grid.len(), 30);
    assert_eq!(grid[0].date, date("2025-06-01"));
    assert_eq!(grid[29].date, date("2025-06-30"));
    assert!(!grid[0].explicit);
    assert_eq!(grid[0].status, ScheduleStatus::Duty);
    assert!(grid[2].explicit);
    assert_eq!(grid[2].status, ScheduleStatus::Leave);
    assert_eq!(grid[2].reason.as_deref(), Some("training"));
    assert_eq!(grid.iter().filter(|d| d.explicit).count(), 1);
}

#[tokio::test]
async fn calendar_rejects_oversized_or_overflowing_windows() {
    let (_, schedules, _) = setup();
    let doctor_id = Uuid::new_v4();

    assert_matches!(
        schedules.calendar(doctor_id, date("2025-06-01"), 1_000_000_000_000).await,
        Err(DoctorError::ValidationError(_))
    );
    assert_matches!(
        schedules.calendar(doctor_id, date("2025-06-01"), i64::MAX).await,
        Err(DoctorError::ValidationError(_))
    );
    assert_matches!(
        schedules.calendar(doctor_id, NaiveDate::MAX, 2).await,
        Err(DoctorError::ValidationError(_))
    );
}
