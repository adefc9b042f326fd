use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{DoctorProfile, ScheduleEntry};
use crate::repository::{DoctorDirectory, ScheduleRepository};

const SCHEDULES: &str = "/rest/v1/doctor_schedules";
const DOCTORS: &str = "/rest/v1/doctors";

pub struct SupabaseScheduleRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseScheduleRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl ScheduleRepository for SupabaseScheduleRepository {
    async fn upsert(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, DatabaseError> {
        debug!("Upserting schedule for doctor {} on {}", entry.doctor_id, entry.schedule_date);

        // schedule_id is left to the column default so a merge keeps the existing key.
        let body = json!({
            "doctor_id": entry.doctor_id,
            "schedule_date": entry.schedule_date,
            "status": entry.status,
            "reason": entry.reason,
            "updated_at": entry.updated_at.to_rfc3339(),
        });

        let path = format!("{}?on_conflict=doctor_id,schedule_date", SCHEDULES);
        let rows: Vec<ScheduleEntry> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            None,
            Some(body),
            Some(SupabaseClient::upsert_merge()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DatabaseError::Decode("upsert returned no rows".to_string()))
    }

    async fn find(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Option<ScheduleEntry>, DatabaseError> {
        let path = format!(
            "{}?doctor_id=eq.{}&schedule_date=eq.{}&limit=1",
            SCHEDULES, doctor_id, date
        );

        let rows: Vec<ScheduleEntry> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn range(&self, doctor_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduleEntry>, DatabaseError> {
        let path = format!(
            "{}?doctor_id=eq.{}&schedule_date=gte.{}&schedule_date=lte.{}&order=schedule_date.asc",
            SCHEDULES, doctor_id, start, end
        );

        self.supabase.request(Method::GET, &path, None, None).await
    }
}

pub struct SupabaseDoctorDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDoctorDirectory {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, DatabaseError> {
        let path = format!(
            "{}?id=eq.{}&select=id,full_name,specialty,consultation_fee,is_active",
            DOCTORS, doctor_id
        );

        let rows: Vec<DoctorProfile> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }
}
