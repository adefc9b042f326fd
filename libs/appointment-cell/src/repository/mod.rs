use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, LedgerError};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryAppointmentLedger;
pub use supabase::SupabaseAppointmentLedger;

/// Persistence for the `appointments` table.
///
/// Implementations must reject an insert whose (doctor, date, token) is
/// already present with `LedgerError::TokenTaken`, and one that would give a
/// patient a second active appointment with the same doctor that day with
/// `LedgerError::ActiveDuplicate`. Rows are never deleted.
#[async_trait]
pub trait AppointmentLedger: Send + Sync {
    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, LedgerError>;

    /// Non-terminal appointments of a patient on a date, across all doctors.
    async fn active_for_patient_on(&self, patient_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, LedgerError>;

    /// Highest token issued for the doctor-day, whatever the row's status.
    async fn max_token(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Option<i32>, LedgerError>;

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, LedgerError>;

    /// Move `appointment_id` from `from` to `to`. Returns `None` when the row
    /// is no longer in `from`.
    async fn transition(
        &self,
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Option<Appointment>, LedgerError>;

    /// Every appointment for the doctor-day, ordered by token.
    async fn for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, LedgerError>;

    /// A patient's appointments, newest date first, then by token.
    async fn for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, LedgerError>;
}
