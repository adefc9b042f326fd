pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;

use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::AuthService;

/// Shared handles for the auth routes.
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
}
