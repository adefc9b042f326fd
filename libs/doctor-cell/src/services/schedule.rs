use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::models::{DaySchedule, DoctorError, ScheduleEntry, ScheduleStatus};
use crate::repository::ScheduleRepository;

const MAX_REASON_LEN: usize = 500;
pub const DEFAULT_CALENDAR_DAYS: i64 = 30;

pub struct ScheduleService {
    repository: Arc<dyn ScheduleRepository>,
    max_range_days: i64,
}

impl ScheduleService {
    pub fn new(repository: Arc<dyn ScheduleRepository>, max_range_days: i64) -> Self {
        Self {
            repository,
            max_range_days: max_range_days.max(1),
        }
    }

    /// Record DUTY or LEAVE for one date. Repeating the call is harmless;
    /// the latest write wins.
    #[instrument(skip(self, reason))]
    pub async fn set_schedule(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        status: ScheduleStatus,
        reason: Option<String>,
    ) -> Result<ScheduleEntry, DoctorError> {
        let reason = match status {
            ScheduleStatus::Duty => None,
            ScheduleStatus::Leave => normalize_reason(reason)?,
        };

        let entry = ScheduleEntry {
            schedule_id: Uuid::new_v4(),
            doctor_id,
            schedule_date: date,
            status,
            reason,
            updated_at: Utc::now(),
        };

        let stored = self.repository.upsert(entry).await?;
        info!("Doctor {} marked {} on {}", doctor_id, stored.status, date);
        Ok(stored)
    }

    /// Stored entries between `start` and `end` inclusive, ordered by date.
    pub async fn get_range(
        &self,
        doctor_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>, DoctorError> {
        if start > end {
            return Err(DoctorError::ValidationError(
                "Range start must not be after range end".to_string(),
            ));
        }

        let span = (end - start).num_days() + 1;
        if span > self.max_range_days {
            return Err(DoctorError::ValidationError(format!(
                "Range spans {} days, maximum is {}",
                span, self.max_range_days
            )));
        }

        debug!("Fetching schedule for doctor {} from {} to {}", doctor_id, start, end);
        let mut entries = self.repository.range(doctor_id, start, end).await?;
        entries.sort_by_key(|entry| entry.schedule_date);
        Ok(entries)
    }

    /// Day-by-day grid starting at `start`, filling days without an entry
    /// with the implied DUTY status.
    pub async fn calendar(
        &self,
        doctor_id: Uuid,
        start: NaiveDate,
        days: i64,
    ) -> Result<Vec<DaySchedule>, DoctorError> {
        if days < 1 {
            return Err(DoctorError::ValidationError("Calendar needs at least one day".to_string()));
        }

        if days > self.max_range_days {
            return Err(DoctorError::ValidationError(format!(
                "Calendar spans {} days, maximum is {}",
                days, self.max_range_days
            )));
        }

        let end = start
            .checked_add_signed(Duration::days(days - 1))
            .ok_or_else(|| DoctorError::ValidationError(format!("Calendar starting {} runs past the last supported date", start)))?;
        let entries = self.get_range(doctor_id, start, end).await?;
        let mut stored = entries.into_iter().peekable();

        let grid = start
            .iter_days()
            .take(days as usize)
            .map(|date| match stored.next_if(|entry| entry.schedule_date == date) {
                Some(entry) => DaySchedule {
                    date,
                    status: entry.status,
                    reason: entry.reason,
                    explicit: true,
                },
                None => DaySchedule {
                    date,
                    status: ScheduleStatus::Duty,
                    reason: None,
                    explicit: false,
                },
            })
            .collect();

        Ok(grid)
    }
}

fn normalize_reason(reason: Option<String>) -> Result<Option<String>, DoctorError> {
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    if let Some(text) = &reason {
        if text.chars().count() > MAX_REASON_LEN {
            return Err(DoctorError::ValidationError(format!(
                "Leave reason must be at most {} characters",
                MAX_REASON_LEN
            )));
        }
    }

    Ok(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reasons_are_dropped() {
        assert_eq!(normalize_reason(Some("   ".to_string())).unwrap(), None);
        assert_eq!(normalize_reason(Some(" flu ".to_string())).unwrap(), Some("flu".to_string()));
        assert!(normalize_reason(Some("x".repeat(MAX_REASON_LEN + 1))).is_err());
    }
}
