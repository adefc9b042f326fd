use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Appointment, AppointmentStatus, LedgerError};
use crate::repository::AppointmentLedger;

const APPOINTMENTS: &str = "/rest/v1/appointments";
const ACTIVE_DUPLICATE_INDEX: &str = "appointments_patient_doctor_day_active_key";

#[derive(Deserialize)]
struct TokenRow {
    token_number: i32,
}

/// Ledger backed by the PostgREST `appointments` table. The two unique
/// indexes in `sql/schema.sql` arbitrate races between processes.
pub struct SupabaseAppointmentLedger {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentLedger {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn day_filter(date: NaiveDate) -> Result<String, LedgerError> {
        let next = date.succ_opt().ok_or(LedgerError::DateOutOfRange(date))?;
        Ok(format!(
            "appointment_datetime=gte.{}T00:00:00&appointment_datetime=lt.{}T00:00:00",
            date, next
        ))
    }

    fn conflict_error(appointment: &Appointment, message: &str) -> LedgerError {
        let date = appointment.appointment_date();
        if message.contains(ACTIVE_DUPLICATE_INDEX) {
            LedgerError::ActiveDuplicate {
                patient_id: appointment.patient_id,
                doctor_id: appointment.doctor_id,
                date,
            }
        } else {
            LedgerError::TokenTaken {
                doctor_id: appointment.doctor_id,
                date,
                token_number: appointment.token_number,
            }
        }
    }
}

#[async_trait]
impl AppointmentLedger for SupabaseAppointmentLedger {
    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, LedgerError> {
        let path = format!("{}?appointment_id=eq.{}&limit=1", APPOINTMENTS, appointment_id);
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn active_for_patient_on(&self, patient_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, LedgerError> {
        let path = format!(
            "{}?patient_id=eq.{}&{}&status=not.in.(CANCELLED,COMPLETED)&order=created_at.asc",
            APPOINTMENTS, patient_id, Self::day_filter(date)?
        );

        Ok(self.supabase.request(Method::GET, &path, None, None).await?)
    }

    async fn max_token(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Option<i32>, LedgerError> {
        let path = format!(
            "{}?doctor_id=eq.{}&{}&select=token_number&order=token_number.desc&limit=1",
            APPOINTMENTS, doctor_id, Self::day_filter(date)?
        );

        let rows: Vec<TokenRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.first().map(|row| row.token_number))
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, LedgerError> {
        debug!(
            "Inserting appointment {} (doctor {}, token {})",
            appointment.appointment_id, appointment.doctor_id, appointment.token_number
        );

        let body = serde_json::to_value(&appointment).map_err(DatabaseError::from)?;
        let result: Result<Vec<Appointment>, DatabaseError> = self.supabase.request_with_headers(
            Method::POST,
            APPOINTMENTS,
            None,
            Some(body),
            Some(SupabaseClient::return_representation()),
        ).await;

        match result {
            Ok(rows) => rows.into_iter()
                .next()
                .ok_or_else(|| LedgerError::Database(DatabaseError::Decode("insert returned no rows".to_string()))),
            Err(DatabaseError::Conflict(message)) => {
                warn!("Insert rejected by unique index: {}", message);
                Err(Self::conflict_error(&appointment, &message))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn transition(
        &self,
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Option<Appointment>, LedgerError> {
        let path = format!(
            "{}?appointment_id=eq.{}&status=eq.{}",
            APPOINTMENTS, appointment_id, from
        );

        let mut body = json!({
            "status": to,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(reason) = cancellation_reason {
            body["cancellation_reason"] = json!(reason);
        }

        let rows: Vec<Appointment> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            None,
            Some(body),
            Some(SupabaseClient::return_representation()),
        ).await?;

        Ok(rows.into_iter().next())
    }

    async fn for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, LedgerError> {
        let path = format!(
            "{}?doctor_id=eq.{}&{}&order=token_number.asc",
            APPOINTMENTS, doctor_id, Self::day_filter(date)?
        );

        Ok(self.supabase.request(Method::GET, &path, None, None).await?)
    }

    async fn for_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, LedgerError> {
        let path = format!(
            "{}?patient_id=eq.{}&order=appointment_datetime.desc,token_number.asc",
            APPOINTMENTS, patient_id
        );

        Ok(self.supabase.request(Method::GET, &path, None, None).await?)
    }
}
