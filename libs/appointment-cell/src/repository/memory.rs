use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, LedgerError};
use crate::repository::AppointmentLedger;

#[derive(Default)]
struct LedgerTables {
    rows: HashMap<Uuid, Appointment>,
    tokens: HashSet<(Uuid, NaiveDate, i32)>,
}

impl LedgerTables {
    fn active_duplicate(&self, appointment: &Appointment) -> bool {
        let date = appointment.appointment_date();
        self.rows.values().any(|row| {
            row.is_active()
                && row.patient_id == appointment.patient_id
                && row.doctor_id == appointment.doctor_id
                && row.appointment_date() == date
        })
    }
}

/// Ledger kept in process memory, enforcing the same uniqueness rules as the
/// SQL schema. Each write takes the table lock, so inserts are atomic.
#[derive(Default)]
pub struct InMemoryAppointmentLedger {
    tables: RwLock<LedgerTables>,
}

impl InMemoryAppointmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.rows.len()
    }
}

#[async_trait]
impl AppointmentLedger for InMemoryAppointmentLedger {
    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, LedgerError> {
        Ok(self.tables.read().await.rows.get(&appointment_id).cloned())
    }

    async fn active_for_patient_on(&self, patient_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, LedgerError> {
        let tables = self.tables.read().await;
        let mut active: Vec<Appointment> = tables.rows
            .values()
            .filter(|row| row.patient_id == patient_id && row.appointment_date() == date && row.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|row| row.created_at);
        Ok(active)
    }

    async fn max_token(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Option<i32>, LedgerError> {
        let tables = self.tables.read().await;
        Ok(tables.tokens
            .iter()
            .filter(|(doctor, day, _)| *doctor == doctor_id && *day == date)
            .map(|(_, _, token)| *token)
            .max())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, LedgerError> {
        let mut tables = self.tables.write().await;
        let date = appointment.appointment_date();
        let token_key = (appointment.doctor_id, date, appointment.token_number);

        if tables.tokens.contains(&token_key) {
            return Err(LedgerError::TokenTaken {
                doctor_id: appointment.doctor_id,
                date,
                token_number: appointment.token_number,
            });
        }

        if appointment.is_active() && tables.active_duplicate(&appointment) {
            return Err(LedgerError::ActiveDuplicate {
                patient_id: appointment.patient_id,
                doctor_id: appointment.doctor_id,
                date,
            });
        }

        tables.tokens.insert(token_key);
        tables.rows.insert(appointment.appointment_id, appointment.clone());
        Ok(appointment)
    }

    async fn transition(
        &self,
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Option<Appointment>, LedgerError> {
        let mut tables = self.tables.write().await;

        let Some(row) = tables.rows.get_mut(&appointment_id) else {
            return Ok(None);
        };
        if row.status != from {
            return Ok(None);
        }

        row.status = to;
        row.updated_at = Utc::now();
        if cancellation_reason.is_some() {
            row.cancellation_reason = cancellation_reason;
        }

        Ok(Some(row.clone()))
    }

    async fn for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, LedgerError> {
        let tables = self.tables.read().await;
        let mut queue: Vec<Appointment> = tables.rows
            .values()
            .filter(|row| row.doctor_id == doctor_id && row.appointment_date() == date)
            .cloned()
            .collect();
        queue.sort_by_key(|row| row.token_number);
        Ok(queue)
    }

    async fn for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, LedgerError> {
        let tables = self.tables.read().await;
        let mut history: Vec<Appointment> = tables.rows
            .values()
            .filter(|row| row.patient_id == patient_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            b.appointment_datetime
                .cmp(&a.appointment_datetime)
                .then(a.token_number.cmp(&b.token_number))
        });
        Ok(history)
    }
}
