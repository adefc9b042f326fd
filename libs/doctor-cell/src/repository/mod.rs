use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use shared_database::DatabaseError;

use crate::models::{DoctorProfile, ScheduleEntry};

pub mod memory;
pub mod supabase;

pub use memory::{InMemoryDoctorDirectory, InMemoryScheduleRepository};
pub use supabase::{SupabaseDoctorDirectory, SupabaseScheduleRepository};

/// Persistence for `doctor_schedules`, unique on (doctor_id, schedule_date).
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Insert or replace the entry for its (doctor, date) key. An existing
    /// row keeps its `schedule_id`.
    async fn upsert(&self, entry: ScheduleEntry) -> Result<ScheduleEntry, DatabaseError>;

    async fn find(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Option<ScheduleEntry>, DatabaseError>;

    /// Entries with `start <= schedule_date <= end`, ascending by date.
    async fn range(&self, doctor_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduleEntry>, DatabaseError>;
}

/// Read access to doctor profiles owned by the profile service.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<DoctorProfile>, DatabaseError>;
}
