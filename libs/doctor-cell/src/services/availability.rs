use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use shared_database::DatabaseError;

use crate::models::{Availability, ScheduleStatus};
use crate::repository::ScheduleRepository;

/// Answers "can this doctor take bookings on this date" from the schedule store.
pub struct AvailabilityResolver {
    repository: Arc<dyn ScheduleRepository>,
}

impl AvailabilityResolver {
    pub fn new(repository: Arc<dyn ScheduleRepository>) -> Self {
        Self { repository }
    }

    pub async fn is_available(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Availability, DatabaseError> {
        let entry = self.repository.find(doctor_id, date).await?;

        let availability = match entry {
            None => Availability::available(),
            Some(entry) => match entry.status {
                ScheduleStatus::Duty => Availability::available(),
                ScheduleStatus::Leave => Availability::on_leave(entry.reason),
            },
        };

        debug!("Doctor {} on {}: available={}", doctor_id, date, availability.available);
        Ok(availability)
    }
}
