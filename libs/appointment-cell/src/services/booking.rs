// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::services::{AvailabilityResolver, DoctorProfileService};
use shared_models::auth::User;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, BookingError, BookingOutcome,
    BookingPolicy, CrossDoctorConflict, LedgerError, NewAppointment,
};
use crate::repository::AppointmentLedger;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::tokens::TokenAllocator;

const MAX_CANCELLATION_REASON_LEN: usize = 500;

/// Result of one pass through the duplicate checks and the guarded insert.
enum Attempt {
    Done(BookingOutcome),
    Conflict(LedgerError),
}

pub struct AppointmentBookingService {
    availability: Arc<AvailabilityResolver>,
    doctors: Arc<DoctorProfileService>,
    ledger: Arc<dyn AppointmentLedger>,
    allocator: TokenAllocator,
    lifecycle_service: AppointmentLifecycleService,
    policy: BookingPolicy,
}

impl AppointmentBookingService {
    pub fn new(
        availability: Arc<AvailabilityResolver>,
        doctors: Arc<DoctorProfileService>,
        ledger: Arc<dyn AppointmentLedger>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            availability,
            doctors,
            ledger,
            allocator: TokenAllocator::new(),
            lifecycle_service: AppointmentLifecycleService::new(),
            policy,
        }
    }

    pub fn allocator(&self) -> &TokenAllocator {
        &self.allocator
    }

    /// Book a patient with a doctor for a date and assign the next token.
    ///
    /// Leave, duplicate and cross-doctor checks run first and are final.
    /// Only a lost race on the ledger's unique indexes is retried.
    #[instrument(skip(self, request, requested_by), fields(
        patient_id = %request.patient_id,
        doctor_id = %request.doctor_id,
        date = %request.date,
    ))]
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
        requested_by: &User,
    ) -> Result<BookingOutcome, BookingError> {
        if request.patient_id.is_nil() || request.doctor_id.is_nil() {
            return Err(BookingError::ValidationError("patient_id and doctor_id are required".to_string()));
        }

        let availability = self.availability
            .is_available(request.doctor_id, request.date)
            .await?;
        if !availability.available {
            info!("Rejecting booking, doctor {} on leave {}", request.doctor_id, request.date);
            return Err(BookingError::DoctorOnLeave { reason: availability.reason });
        }

        let doctor = self.doctors.bookable_doctor(request.doctor_id).await?;
        let created_by = requested_by.audit_name();

        let max_attempts = self.policy.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.attempt_booking(&request, doctor.consultation_fee, &created_by).await? {
                Attempt::Done(outcome) => {
                    if let BookingOutcome::Booked(ref appointment) = outcome {
                        info!(
                            "Booked appointment {} with token {} (attempt {})",
                            appointment.appointment_id, appointment.token_number, attempt
                        );
                    }
                    return Ok(outcome);
                }
                Attempt::Conflict(conflict) => {
                    warn!("Booking attempt {}/{} lost a race: {}", attempt, max_attempts, conflict);
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.retry_backoff * attempt).await;
                    }
                }
            }
        }

        Err(BookingError::BookingTransientFailure { attempts: max_attempts })
    }

    async fn attempt_booking(
        &self,
        request: &BookAppointmentRequest,
        consultation_fee: f64,
        created_by: &str,
    ) -> Result<Attempt, BookingError> {
        let active = self.ledger
            .active_for_patient_on(request.patient_id, request.date)
            .await?;

        if let Some(existing) = active.iter().find(|a| a.doctor_id == request.doctor_id) {
            return Err(duplicate(existing));
        }

        let other_doctors: Vec<Appointment> = active.into_iter()
            .filter(|a| a.doctor_id != request.doctor_id)
            .collect();
        if !other_doctors.is_empty() && !request.confirm_cross_doctor {
            debug!("Patient {} already booked with {} other doctor(s)", request.patient_id, other_doctors.len());
            return Ok(Attempt::Done(BookingOutcome::NeedsConfirmation(CrossDoctorConflict {
                patient_id: request.patient_id,
                date: request.date,
                existing: other_doctors,
            })));
        }

        let slot = self.allocator.lock(request.doctor_id, request.date).await;

        // A concurrent request for the same patient may have committed while we waited.
        let mine = self.ledger
            .active_for_patient_on(request.patient_id, request.date)
            .await?;
        if let Some(existing) = mine.iter().find(|a| a.doctor_id == request.doctor_id) {
            return Err(duplicate(existing));
        }

        let token_number = self.allocator
            .next_token(&slot, self.ledger.as_ref(), request.doctor_id, request.date)
            .await?;

        let appointment = NewAppointment {
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            date: request.date,
            token_number,
            consultation_fee,
            created_by: created_by.to_string(),
        }
        .into_appointment(Utc::now());

        let result = self.ledger.insert(appointment).await;
        drop(slot);

        match result {
            Ok(appointment) => Ok(Attempt::Done(BookingOutcome::Booked(appointment))),
            Err(e) if e.is_conflict() => Ok(Attempt::Conflict(e)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        self.ledger
            .get(appointment_id)
            .await?
            .ok_or(BookingError::AppointmentNotFound(appointment_id))
    }

    pub async fn start_consultation(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        self.transition(appointment_id, AppointmentStatus::InProgress, None).await
    }

    pub async fn complete(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        self.transition(appointment_id, AppointmentStatus::Completed, None).await
    }

    pub async fn cancel(&self, appointment_id: Uuid, reason: Option<String>) -> Result<Appointment, BookingError> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        if reason.as_ref().is_some_and(|r| r.chars().count() > MAX_CANCELLATION_REASON_LEN) {
            return Err(BookingError::ValidationError(format!(
                "Cancellation reason must be at most {} characters",
                MAX_CANCELLATION_REASON_LEN
            )));
        }

        self.transition(appointment_id, AppointmentStatus::Cancelled, reason).await
    }

    pub async fn mark_no_show(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        self.transition(appointment_id, AppointmentStatus::NoShow, None).await
    }

    /// Compare-and-set on the row's current status.
    #[instrument(skip(self, cancellation_reason))]
    async fn transition(
        &self,
        appointment_id: Uuid,
        to: AppointmentStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Appointment, BookingError> {
        let current = self.get_appointment(appointment_id).await?;
        self.lifecycle_service.validate_status_transition(current.status, to)?;

        let updated = self.ledger
            .transition(appointment_id, current.status, to, cancellation_reason)
            .await?;

        match updated {
            Some(appointment) => {
                info!("Appointment {} moved {} -> {}", appointment_id, current.status, to);
                Ok(appointment)
            }
            None => {
                // Someone else changed the row between the read and the write.
                let latest = self.get_appointment(appointment_id).await?;
                warn!(
                    "Appointment {} changed concurrently to {}, rejecting move to {}",
                    appointment_id, latest.status, to
                );
                Err(BookingError::InvalidStatusTransition { from: latest.status, to })
            }
        }
    }

    /// Reception queue for a doctor-day, in token order.
    pub async fn doctor_day_queue(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.ledger.for_doctor_on(doctor_id, date).await?)
    }

    pub async fn patient_appointments(&self, patient_id: Uuid) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.ledger.for_patient(patient_id).await?)
    }
}

fn duplicate(existing: &Appointment) -> BookingError {
    BookingError::DuplicateBooking {
        appointment_id: existing.appointment_id,
        token_number: existing.token_number,
    }
}
