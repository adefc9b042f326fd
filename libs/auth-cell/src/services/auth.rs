use std::sync::Arc;

use chrono::Duration;
use tracing::{info, instrument, warn};

use shared_config::AppConfig;
use shared_utils::jwt::{issue_token, TokenSubject};

use crate::models::{AuthError, LoginRequest, LoginResponse};
use crate::repository::StaffDirectory;
use crate::services::password::PasswordService;

/// Staff login: checks the argon2 hash and issues an HS256 access token.
pub struct AuthService {
    config: Arc<AppConfig>,
    directory: Arc<dyn StaffDirectory>,
}

impl AuthService {
    pub fn new(config: Arc<AppConfig>, directory: Arc<dyn StaffDirectory>) -> Self {
        Self { config, directory }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(AuthError::ValidationError("username and password are required".to_string()));
        }

        let Some(account) = self.directory.find_by_username(username).await? else {
            warn!("Login for unknown user {}", username);
            return Err(AuthError::InvalidCredentials);
        };

        let matches = PasswordService::verify_password(&request.password, &account.password_hash)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        if !matches {
            warn!("Wrong password for {}", account.username);
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_active {
            return Err(AuthError::AccountDisabled(account.username));
        }

        let ttl = Duration::minutes(self.config.access_token_ttl_minutes);
        let user_id = account.id.to_string();
        let subject = TokenSubject {
            user_id: &user_id,
            username: &account.username,
            full_name: &account.full_name,
            role: account.role.as_str(),
        };
        let access_token = issue_token(&subject, &self.config.supabase_jwt_secret, ttl)
            .map_err(AuthError::TokenIssue)?;

        info!("User {} logged in as {}", account.username, account.role);

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: ttl.num_seconds(),
            user_id: account.id,
            username: account.username,
            full_name: account.full_name,
            role: account.role,
        })
    }
}
