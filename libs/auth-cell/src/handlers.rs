use axum::extract::{Extension, Json, State};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

use crate::models::{AuthError, LoginRequest, LoginResponse};
use crate::AuthState;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::AccountDisabled(_) => AppError::Forbidden(err.to_string()),
            AuthError::ValidationError(msg) => AppError::ValidationError(msg),
            AuthError::PasswordHash(_) | AuthError::TokenIssue(_) => AppError::Internal(err.to_string()),
            AuthError::Database(db) => AppError::from(db),
        }
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.auth.login(request).await?;
    Ok(Json(response))
}

/// Reports whether the bearer token is currently valid, without rejecting.
#[axum::debug_handler]
pub async fn verify_token(
    State(state): State<AuthState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let TypedHeader(auth) = auth
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    match validate_token(auth.token(), &state.config.supabase_jwt_secret) {
        Ok(user) => Ok(Json(json!({ "valid": true, "user_id": user.id, "role": user.role }))),
        Err(reason) => Ok(Json(json!({ "valid": false, "reason": reason }))),
    }
}

#[axum::debug_handler]
pub async fn me(Extension(user): Extension<User>) -> Json<Value> {
    Json(json!({
        "user_id": user.id,
        "username": user.username,
        "full_name": user.full_name,
        "role": user.role,
        "issued_at": user.issued_at
    }))
}
