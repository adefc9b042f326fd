use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use shared_database::DatabaseError;

// ==============================================================================
// SCHEDULE MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Duty,
    Leave,
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::Duty => write!(f, "DUTY"),
            ScheduleStatus::Leave => write!(f, "LEAVE"),
        }
    }
}

/// A doctor's status for one date. Missing entries mean DUTY.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub schedule_id: Uuid,
    pub doctor_id: Uuid,
    pub schedule_date: NaiveDate,
    pub status: ScheduleStatus,
    pub reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleEntry {
    pub fn new(doctor_id: Uuid, schedule_date: NaiveDate, status: ScheduleStatus, reason: Option<String>) -> Self {
        Self {
            schedule_id: Uuid::new_v4(),
            doctor_id,
            schedule_date,
            status,
            reason,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetScheduleRequest {
    pub status: ScheduleStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarQuery {
    pub start: Option<NaiveDate>,
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

/// One cell of the calendar grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub status: ScheduleStatus,
    pub reason: Option<String>,
    /// False when the day has no stored entry and DUTY is implied.
    pub explicit: bool,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Availability {
    pub available: bool,
    pub reason: Option<String>,
}

impl Availability {
    pub fn available() -> Self {
        Self { available: true, reason: None }
    }

    pub fn on_leave(reason: Option<String>) -> Self {
        Self { available: false, reason }
    }
}

// ==============================================================================
// DOCTOR PROFILE
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub full_name: String,
    pub specialty: Option<String>,
    pub consultation_fee: f64,
    pub is_active: bool,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor {0} not found")]
    DoctorNotFound(Uuid),

    #[error("Doctor {0} is not accepting appointments")]
    DoctorInactive(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
