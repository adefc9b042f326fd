use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DatabaseError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    Doctor,
    Receptionist,
    Pharmacist,
    LabTechnician,
}

impl StaffRole {
    /// Role string carried in access tokens and checked by route guards.
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Doctor => "doctor",
            StaffRole::Receptionist => "receptionist",
            StaffRole::Pharmacist => "pharmacist",
            StaffRole::LabTechnician => "lab_technician",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(StaffRole::Admin),
            "doctor" => Ok(StaffRole::Doctor),
            "receptionist" => Ok(StaffRole::Receptionist),
            "pharmacist" => Ok(StaffRole::Pharmacist),
            "lab_technician" | "labtechnician" => Ok(StaffRole::LabTechnician),
            other => Err(format!("unknown staff role '{}'", other)),
        }
    }
}

/// Row of the `users` table. Doctors share their id with the `doctors` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAccount {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account {0} is disabled")]
    AccountDisabled(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Could not issue token: {0}")]
    TokenIssue(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
