use axum::{
    extract::{Path, Query, State, Extension},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AvailabilityQuery, CalendarQuery, DoctorError, ScheduleRangeQuery, SetScheduleRequest,
};
use crate::services::schedule::DEFAULT_CALENDAR_DAYS;
use crate::DoctorState;

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::DoctorNotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::DoctorInactive(_) => AppError::Unprocessable(err.to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::Database(db) => AppError::from(db),
        }
    }
}

/// Doctors manage their own calendar; admins manage anyone's.
#[axum::debug_handler]
pub async fn set_schedule(
    State(state): State<DoctorState>,
    Path((doctor_id, date)): Path<(Uuid, NaiveDate)>,
    Extension(user): Extension<User>,
    Json(request): Json<SetScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let is_self = user.has_role("doctor") && user.id == doctor_id.to_string();
    if !is_self && !user.has_role("admin") {
        return Err(AppError::Forbidden("Not authorized to change this doctor's schedule".to_string()));
    }

    let entry = state.schedules
        .set_schedule(doctor_id, date, request.status, request.reason)
        .await?;

    Ok(Json(json!({
        "success": true,
        "schedule": entry
    })))
}

#[axum::debug_handler]
pub async fn get_schedule_range(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<ScheduleRangeQuery>,
) -> Result<Json<Value>, AppError> {
    let entries = state.schedules
        .get_range(doctor_id, query.start, query.end)
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "start": query.start,
        "end": query.end,
        "entries": entries
    })))
}

#[axum::debug_handler]
pub async fn get_calendar(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let start = query.start.unwrap_or_else(|| Utc::now().date_naive());
    let days = query.days.unwrap_or(DEFAULT_CALENDAR_DAYS);

    let grid = state.schedules.calendar(doctor_id, start, days).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "days": grid
    })))
}

#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let availability = state.availability
        .is_available(doctor_id, query.date)
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "available": availability.available,
        "reason": availability.reason
    })))
}
