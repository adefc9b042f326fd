// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::models::DoctorError;
use shared_config::AppConfig;
use shared_database::DatabaseError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_datetime: NaiveDateTime,
    pub token_number: i32,
    pub consultation_fee: f64,
    pub status: AppointmentStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancellation_reason: Option<String>,
}

impl Appointment {
    pub fn appointment_date(&self) -> NaiveDate {
        self.appointment_datetime.date()
    }

    /// Whether this appointment still occupies the patient's slot for the day.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::InProgress => "IN_PROGRESS",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to write a fresh ledger row.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub token_number: i32,
    pub consultation_fee: f64,
    pub created_by: String,
}

impl NewAppointment {
    pub fn into_appointment(self, now: DateTime<Utc>) -> Appointment {
        Appointment {
            appointment_id: Uuid::new_v4(),
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            appointment_datetime: self.date.and_time(chrono::NaiveTime::MIN),
            token_number: self.token_number,
            consultation_fee: self.consultation_fee,
            status: AppointmentStatus::Scheduled,
            created_by: self.created_by,
            created_at: now,
            updated_at: now,
            cancellation_reason: None,
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Set after the caller has seen and accepted a cross-doctor warning.
    #[serde(default)]
    pub confirm_cross_doctor: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorQueueQuery {
    pub date: NaiveDate,
}

/// The patient already holds appointments with other doctors that day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrossDoctorConflict {
    pub patient_id: Uuid,
    pub date: NaiveDate,
    pub existing: Vec<Appointment>,
}

impl CrossDoctorConflict {
    pub fn message(&self) -> String {
        format!(
            "Patient already has {} appointment(s) with another doctor on {}; confirm to book anyway",
            self.existing.len(),
            self.date
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Booked(Appointment),
    NeedsConfirmation(CrossDoctorConflict),
}

// ==============================================================================
// BOOKING POLICY
// ==============================================================================

#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Total tries of the check-allocate-insert sequence per booking.
    pub max_attempts: u32,
    /// Backoff before retry `n` is `retry_backoff * n`.
    pub retry_backoff: Duration,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(25),
        }
    }
}

impl From<&AppConfig> for BookingPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.booking_max_attempts.max(1),
            retry_backoff: Duration::from_millis(config.booking_retry_backoff_ms),
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
    #[error("Doctor is on leave{}", .reason.as_deref().map(|r| format!(": {}", r)).unwrap_or_default())]
    DoctorOnLeave { reason: Option<String> },

    #[error("Patient already holds token {token_number} with this doctor on this date (appointment {appointment_id})")]
    DuplicateBooking { appointment_id: Uuid, token_number: i32 },

    #[error("Booking could not be completed after {attempts} attempts due to concurrent bookings; please retry")]
    BookingTransientFailure { attempts: u32 },

    #[error("Appointment store unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Doctor {0} not found")]
    DoctorNotFound(Uuid),

    #[error("Doctor {0} is not accepting appointments")]
    DoctorInactive(Uuid),

    #[error("Appointment {0} not found")]
    AppointmentNotFound(Uuid),

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition { from: AppointmentStatus, to: AppointmentStatus },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<DatabaseError> for BookingError {
    fn from(err: DatabaseError) -> Self {
        BookingError::PersistenceUnavailable(err.to_string())
    }
}

impl From<DoctorError> for BookingError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::DoctorNotFound(id) => BookingError::DoctorNotFound(id),
            DoctorError::DoctorInactive(id) => BookingError::DoctorInactive(id),
            DoctorError::ValidationError(msg) => BookingError::ValidationError(msg),
            DoctorError::Database(db) => BookingError::from(db),
        }
    }
}

/// Failures reported by an appointment ledger.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Token {token_number} already assigned for doctor {doctor_id} on {date}")]
    TokenTaken { doctor_id: Uuid, date: NaiveDate, token_number: i32 },

    #[error("Patient {patient_id} already has an active appointment with doctor {doctor_id} on {date}")]
    ActiveDuplicate { patient_id: Uuid, doctor_id: Uuid, date: NaiveDate },

    #[error("Date {0} is outside the supported calendar")]
    DateOutOfRange(NaiveDate),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl LedgerError {
    /// Constraint races that a fresh attempt can resolve.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::TokenTaken { .. } | LedgerError::ActiveDuplicate { .. })
    }
}

impl From<LedgerError> for BookingError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Database(db) => BookingError::from(db),
            out_of_range @ LedgerError::DateOutOfRange(_) => BookingError::ValidationError(out_of_range.to_string()),
            other => BookingError::PersistenceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(!AppointmentStatus::Scheduled.is_terminal());
        assert!(!AppointmentStatus::InProgress.is_terminal());
        assert!(!AppointmentStatus::NoShow.is_terminal());
    }

    #[test]
    fn status_serializes_as_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&AppointmentStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
        assert_eq!(
            serde_json::from_str::<AppointmentStatus>("\"NO_SHOW\"").unwrap(),
            AppointmentStatus::NoShow
        );
    }

    #[test]
    fn leave_message_includes_reason_when_present() {
        let with_reason = BookingError::DoctorOnLeave { reason: Some("conference".to_string()) };
        let without_reason = BookingError::DoctorOnLeave { reason: None };

        assert_eq!(with_reason.to_string(), "Doctor is on leave: conference");
        assert_eq!(without_reason.to_string(), "Doctor is on leave");
    }

    #[test]
    fn new_appointment_starts_scheduled_at_midnight() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let appointment = NewAppointment {
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date,
            token_number: 4,
            consultation_fee: 300.0,
            created_by: "desk".to_string(),
        }
        .into_appointment(Utc::now());

        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.appointment_date(), date);
        assert_eq!(appointment.token_number, 4);
        assert!(appointment.is_active());
    }
}
