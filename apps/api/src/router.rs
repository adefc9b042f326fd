use axum::{
    Router,
    routing::get,
};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::doctor_routes;

use shared_config::StorageBackend;

use crate::state::AppState;

pub fn create_router(state: &AppState) -> Router {
    let storage = match state.auth.config.storage_backend {
        StorageBackend::Supabase => "supabase",
        StorageBackend::Memory => "memory",
    };

    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .route("/health", get(move || health(storage)))
        .nest("/auth", auth_routes(state.auth.clone()))
        .nest("/doctors", doctor_routes(state.doctors.clone()))
        .nest("/appointments", appointment_routes(state.appointments.clone()))
}

async fn health(storage: &'static str) -> axum::Json<Value> {
    axum::Json(json!({ "status": "ok", "storage": storage }))
}
