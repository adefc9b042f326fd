pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;

pub use models::*;
pub use services::*;

use std::sync::Arc;

use shared_config::AppConfig;

/// Shared handles for the doctor routes.
#[derive(Clone)]
pub struct DoctorState {
    pub config: Arc<AppConfig>,
    pub schedules: Arc<ScheduleService>,
    pub availability: Arc<AvailabilityResolver>,
}
