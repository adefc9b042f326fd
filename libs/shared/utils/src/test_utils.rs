use std::sync::Arc;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, StorageBackend};
use shared_models::auth::User;

use crate::jwt::{issue_token, TokenSubject};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_backend: StorageBackend,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            storage_backend: StorageBackend::Memory,
        }
    }
}

impl TestConfig {
    /// Config pointing the PostgREST backend at a mock server.
    pub fn with_supabase(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            storage_backend: StorageBackend::Supabase,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            storage_backend: self.storage_backend,
            booking_retry_backoff_ms: 1,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("reception1", "receptionist")
    }
}

impl TestUser {
    pub fn new(username: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            role: role.to_string(),
        }
    }

    /// A doctor whose user id is the doctor id used by schedules.
    pub fn doctor(doctor_id: Uuid) -> Self {
        Self {
            id: doctor_id.to_string(),
            username: format!("dr-{}", &doctor_id.to_string()[..8]),
            role: "doctor".to_string(),
        }
    }

    pub fn receptionist(username: &str) -> Self {
        Self::new(username, "receptionist")
    }

    pub fn admin(username: &str) -> Self {
        Self::new(username, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            username: Some(self.username.clone()),
            full_name: Some(format!("Test {}", self.username)),
            role: Some(self.role.clone()),
            issued_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let full_name = format!("Test {}", user.username);
        let subject = TokenSubject {
            user_id: &user.id,
            username: &user.username,
            full_name: &full_name,
            role: &user.role,
        };

        issue_token(&subject, secret, Duration::hours(exp_hours.unwrap_or(24)))
            .expect("test secret must not be empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }

    pub fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_response(doctor_id: &str, full_name: &str, fee: f64) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "full_name": full_name,
            "specialty": "General Medicine",
            "consultation_fee": fee,
            "is_active": true
        })
    }

    pub fn schedule_response(doctor_id: &str, date: &str, status: &str, reason: Option<&str>) -> serde_json::Value {
        json!({
            "schedule_id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "schedule_date": date,
            "status": status,
            "reason": reason,
            "updated_at": "2025-05-20T08:00:00Z"
        })
    }

    pub fn appointment_response(patient_id: &str, doctor_id: &str, date: &str, token: i32, status: &str) -> serde_json::Value {
        json!({
            "appointment_id": Uuid::new_v4(),
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "appointment_datetime": format!("{}T00:00:00", date),
            "token_number": token,
            "consultation_fee": 500.0,
            "status": status,
            "created_by": "reception1",
            "created_at": "2025-05-20T08:00:00Z",
            "updated_at": "2025-05-20T08:00:00Z",
            "cancellation_reason": null
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code,
            "details": null,
            "hint": null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::validate_token;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.storage_backend, StorageBackend::Memory);
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let doctor_id = Uuid::new_v4();
        let user = TestUser::doctor(doctor_id);
        assert_eq!(user.role, "doctor");

        let user_model = user.to_user();
        assert_eq!(user_model.id, doctor_id.to_string());
        assert_eq!(user_model.role, Some("doctor".to_string()));
    }

    #[test]
    fn test_jwt_token_creation() {
        let config = TestConfig::default();
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(validate_token(&token, &config.jwt_secret).unwrap().id, user.id);
        assert!(validate_token(&JwtTestUtils::create_expired_token(&user, &config.jwt_secret), &config.jwt_secret).is_err());
    }
}
