use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};
use tracing::warn;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub async fn extract_user<B>(request: &Request<B>) -> Result<User, AppError> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Auth("User not found in request extensions".to_string()))
}

/// Fail with 403 unless the caller holds one of `roles`.
pub fn require_any_role(user: &User, roles: &[&str], action: &str) -> Result<(), AppError> {
    if user.has_any_role(roles) {
        return Ok(());
    }

    warn!("User {} with role {:?} attempted to {}", user.id, user.role, action);
    Err(AppError::Forbidden(format!(
        "Role {} is not allowed to {}",
        user.role.as_deref().unwrap_or("unknown"),
        action
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user_with_role(role: &str) -> User {
        User {
            id: "u-1".to_string(),
            username: Some("u1".to_string()),
            full_name: None,
            role: Some(role.to_string()),
            issued_at: None,
        }
    }

    #[test]
    fn role_guard_accepts_listed_roles() {
        let user = user_with_role("receptionist");
        assert!(require_any_role(&user, &["admin", "receptionist"], "book appointments").is_ok());
    }

    #[test]
    fn role_guard_rejects_other_roles() {
        let user = user_with_role("pharmacist");
        assert_matches!(
            require_any_role(&user, &["admin"], "set schedules"),
            Err(AppError::Forbidden(msg)) if msg.contains("pharmacist")
        );
    }
}
