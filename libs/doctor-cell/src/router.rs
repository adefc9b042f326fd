use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::DoctorState;

pub fn doctor_routes(state: DoctorState) -> Router {
    Router::new()
        .route("/{doctor_id}/schedule/{date}", put(handlers::set_schedule))
        .route("/{doctor_id}/schedule", get(handlers::get_schedule_range))
        .route("/{doctor_id}/calendar", get(handlers::get_calendar))
        .route("/{doctor_id}/availability", get(handlers::check_availability))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
