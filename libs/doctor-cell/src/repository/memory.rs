use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::DatabaseError;

use crate::models::{DoctorProfile, ScheduleEntry};
use crate::repository::{DoctorDirectory, ScheduleRepository};

#[derive(Default)]
pub struct InMemoryScheduleRepository {
    entries: RwLock<BTreeMap<(Uuid, NaiveDate), ScheduleEntry>>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn upsert(&self, mut entry: ScheduleEntry) -> Result<ScheduleEntry, DatabaseError> {
        let mut entries = self.entries.write().await;
        let key = (entry.doctor_id, entry.schedule_date);

        if let Some(existing) = entries.get(&key) {
            entry.schedule_id = existing.schedule_id;
        }

        entries.insert(key, entry.clone());
        Ok(entry)
    }

    async fn find(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Option<ScheduleEntry>, DatabaseError> {
        Ok(self.entries.read().await.get(&(doctor_id, date)).cloned())
    }

    async fn range(&self, doctor_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduleEntry>, DatabaseError> {
        if start > end {
            return Ok(Vec::new());
        }

        let entries = self.entries.read().await;
        Ok(entries
            .range((doctor_id, start)..=(doctor_id, end))
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryDoctorDirectory {
    doctors: RwLock<HashMap<Uuid, DoctorProfile>>,
}

impl InMemoryDoctorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, profile: DoctorProfile) {
        self.doctors.write().await.insert(profile.id, profile);
    }

    /// Change a doctor's current fee. Booked appointments keep their snapshot.
    pub async fn set_fee(&self, doctor_id: Uuid, fee: f64) -> Result<(), DatabaseError> {
        let mut doctors = self.doctors.write().await;
        let profile = doctors
            .get_mut(&doctor_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("doctor {}", doctor_id)))?;
        profile.consultation_fee = fee;
        Ok(())
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDoctorDirectory {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, DatabaseError> {
        Ok(self.doctors.read().await.get(&doctor_id).cloned())
    }
}
