// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_any_role;

use crate::models::{
    BookAppointmentRequest, BookingError, BookingOutcome, CancelAppointmentRequest, DoctorQueueQuery,
};
use crate::AppointmentState;

const FRONT_DESK: &[&str] = &["receptionist", "admin"];
const CLINICIANS: &[&str] = &["doctor", "admin"];
const STATUS_EDITORS: &[&str] = &["receptionist", "doctor", "admin"];

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::DoctorOnLeave { .. } | BookingError::DoctorInactive(_) => {
                AppError::Unprocessable(err.to_string())
            }
            BookingError::DuplicateBooking { .. } | BookingError::InvalidStatusTransition { .. } => {
                AppError::Conflict(err.to_string())
            }
            BookingError::DoctorNotFound(_) | BookingError::AppointmentNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            BookingError::ValidationError(msg) => AppError::ValidationError(msg),
            BookingError::BookingTransientFailure { .. } | BookingError::PersistenceUnavailable(_) => {
                AppError::ServiceUnavailable(err.to_string())
            }
        }
    }
}

// ==============================================================================
// BOOKING
// ==============================================================================

/// Book at the front desk. A cross-doctor clash comes back as 200 with
/// `requires_confirmation`; resubmit with `confirm_cross_doctor: true`.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_any_role(&user, FRONT_DESK, "book appointments")?;

    match state.booking.book(request, &user).await? {
        BookingOutcome::Booked(appointment) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "appointment": appointment,
                "message": format!("Appointment booked with token {}", appointment.token_number)
            })),
        )),
        BookingOutcome::NeedsConfirmation(conflict) => Ok((
            StatusCode::OK,
            Json(json!({
                "success": false,
                "requires_confirmation": true,
                "message": conflict.message(),
                "conflicting_appointments": conflict.existing
            })),
        )),
    }
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[axum::debug_handler]
pub async fn start_consultation(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_any_role(&user, CLINICIANS, "start consultations")?;

    let appointment = state.booking.start_consultation(appointment_id).await?;
    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_any_role(&user, CLINICIANS, "complete consultations")?;

    let appointment = state.booking.complete(appointment_id).await?;
    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_any_role(&user, STATUS_EDITORS, "cancel appointments")?;

    let appointment = state.booking.cancel(appointment_id, request.reason).await?;
    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled"
    })))
}

#[axum::debug_handler]
pub async fn mark_no_show(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_any_role(&user, STATUS_EDITORS, "mark no-shows")?;

    let appointment = state.booking.mark_no_show(appointment_id).await?;
    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

// ==============================================================================
// LISTINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_queue(
    State(state): State<AppointmentState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<DoctorQueueQuery>,
) -> Result<Json<Value>, AppError> {
    let queue = state.booking.doctor_day_queue(doctor_id, query.date).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "total": queue.len(),
        "appointments": queue
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<AppointmentState>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.booking.patient_appointments(patient_id).await?;

    Ok(Json(json!({
        "patient_id": patient_id,
        "total": appointments.len(),
        "appointments": appointments
    })))
}
