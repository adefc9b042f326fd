#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use uuid::Uuid;

use appointment_cell::models::{BookAppointmentRequest, BookingPolicy};
use appointment_cell::repository::{AppointmentLedger, InMemoryAppointmentLedger};
use appointment_cell::services::AppointmentBookingService;
use doctor_cell::models::{DoctorProfile, ScheduleStatus};
use doctor_cell::repository::{InMemoryDoctorDirectory, InMemoryScheduleRepository};
use doctor_cell::services::{AvailabilityResolver, DoctorProfileService, ScheduleService};
use shared_models::auth::User;
use shared_utils::test_utils::TestUser;

pub struct Clinic {
    pub booking: Arc<AppointmentBookingService>,
    pub schedules: Arc<ScheduleService>,
    pub ledger: Arc<InMemoryAppointmentLedger>,
    pub directory: Arc<InMemoryDoctorDirectory>,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fast_policy() -> BookingPolicy {
    BookingPolicy {
        max_attempts: 3,
        retry_backoff: Duration::from_millis(1),
    }
}

pub fn receptionist() -> User {
    TestUser::receptionist("desk1").to_user()
}

pub fn request(patient_id: Uuid, doctor_id: Uuid, day: NaiveDate) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id,
        doctor_id,
        date: day,
        confirm_cross_doctor: false,
    }
}

pub fn profile(doctor_id: Uuid, fee: f64) -> DoctorProfile {
    DoctorProfile {
        id: doctor_id,
        full_name: "Dr. Test".to_string(),
        specialty: Some("General Medicine".to_string()),
        consultation_fee: fee,
        is_active: true,
    }
}

impl Clinic {
    pub fn new() -> Self {
        let ledger = Arc::new(InMemoryAppointmentLedger::new());
        Self::with_ledger(ledger.clone(), ledger)
    }

    /// Booking service over an arbitrary ledger; `ledger` stays observable.
    pub fn with_ledger(inner: Arc<InMemoryAppointmentLedger>, ledger: Arc<dyn AppointmentLedger>) -> Self {
        let schedule_repo = Arc::new(InMemoryScheduleRepository::new());
        let directory = Arc::new(InMemoryDoctorDirectory::new());

        let booking = AppointmentBookingService::new(
            Arc::new(AvailabilityResolver::new(schedule_repo.clone())),
            Arc::new(DoctorProfileService::new(directory.clone())),
            ledger,
            fast_policy(),
        );

        Self {
            booking: Arc::new(booking),
            schedules: Arc::new(ScheduleService::new(schedule_repo, 90)),
            ledger: inner,
            directory,
        }
    }

    pub async fn add_doctor(&self, fee: f64) -> Uuid {
        let doctor_id = Uuid::new_v4();
        self.directory.register(profile(doctor_id, fee)).await;
        doctor_id
    }

    pub async fn put_on_leave(&self, doctor_id: Uuid, day: NaiveDate, reason: &str) {
        self.schedules
            .set_schedule(doctor_id, day, ScheduleStatus::Leave, Some(reason.to_string()))
            .await
            .unwrap();
    }
}
