mod common;

use std::collections::HashSet;

use futures::future::join_all;
use uuid::Uuid;

use appointment_cell::models::{BookingError, BookingOutcome};
use common::{date, receptionist, request, Clinic};

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_racing_bookings_get_contiguous_unique_tokens() {
    const PATIENTS: usize = 64;

    let clinic = Clinic::new();
    let doctor = clinic.add_doctor(300.0).await;
    let day = date(2025, 6, 1);

    let tasks = (0..PATIENTS).map(|_| {
        let booking = clinic.booking.clone();
        tokio::spawn(async move {
            booking.book(request(Uuid::new_v4(), doctor, day), &receptionist()).await
        })
    });

    let mut tokens: Vec<i32> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| match joined.unwrap() {
            Ok(BookingOutcome::Booked(appointment)) => appointment.token_number,
            other => panic!("booking failed: {:?}", other),
        })
        .collect();
    tokens.sort_unstable();

    assert_eq!(tokens, (1..=PATIENTS as i32).collect::<Vec<_>>());
    assert_eq!(clinic.booking.allocator().tracked_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_doctor_days_have_independent_sequences_under_load() {
    let clinic = Clinic::new();
    let first = clinic.add_doctor(300.0).await;
    let second = clinic.add_doctor(300.0).await;
    let days = [date(2025, 6, 1), date(2025, 6, 2)];

    let mut tasks = Vec::new();
    for doctor in [first, second] {
        for day in days {
            for _ in 0..10 {
                let booking = clinic.booking.clone();
                tasks.push(tokio::spawn(async move {
                    booking.book(request(Uuid::new_v4(), doctor, day), &receptionist()).await
                }));
            }
        }
    }
    for joined in join_all(tasks).await {
        assert!(matches!(joined.unwrap(), Ok(BookingOutcome::Booked(_))));
    }

    for doctor in [first, second] {
        for day in days {
            let queue = clinic.booking.doctor_day_queue(doctor, day).await.unwrap();
            let tokens: Vec<i32> = queue.iter().map(|a| a.token_number).collect();
            assert_eq!(tokens, (1..=10).collect::<Vec<_>>());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_double_submit_for_one_patient_books_once() {
    let clinic = Clinic::new();
    let doctor = clinic.add_doctor(300.0).await;
    let patient = Uuid::new_v4();
    let day = date(2025, 6, 1);

    let tasks = (0..8).map(|_| {
        let booking = clinic.booking.clone();
        tokio::spawn(async move { booking.book(request(patient, doctor, day), &receptionist()).await })
    });

    let results: Vec<_> = join_all(tasks).await.into_iter().map(|j| j.unwrap()).collect();

    let booked: HashSet<Uuid> = results
        .iter()
        .filter_map(|r| match r {
            Ok(BookingOutcome::Booked(a)) => Some(a.appointment_id),
            _ => None,
        })
        .collect();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(BookingError::DuplicateBooking { .. })))
        .count();

    assert_eq!(booked.len(), 1);
    assert_eq!(duplicates, 7);
    assert_eq!(clinic.ledger.len().await, 1);
}
