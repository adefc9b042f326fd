use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use auth_cell::models::{StaffAccount, StaffRole};
use auth_cell::services::PasswordService;
use doctor_cell::models::DoctorProfile;

use crate::state::MemoryStores;

/// Staff entry as written in a seed file. Passwords are hashed on load.
#[derive(Debug, Deserialize)]
struct SeedStaff {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    username: String,
    full_name: String,
    role: StaffRole,
    password: String,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    doctors: Vec<DoctorProfile>,
    #[serde(default)]
    staff: Vec<SeedStaff>,
}

/// Populate the in-memory directories from a JSON seed file.
pub async fn load(path: &Path, stores: &MemoryStores) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading seed file {}", path.display()))?;
    apply(&raw, stores).await
}

async fn apply(raw: &str, stores: &MemoryStores) -> Result<()> {
    let seed: SeedFile = serde_json::from_str(raw).context("parsing seed file")?;
    let (doctors, staff) = (seed.doctors.len(), seed.staff.len());

    for doctor in seed.doctors {
        stores.doctors.register(doctor).await;
    }

    for entry in seed.staff {
        let password_hash = PasswordService::hash_password(&entry.password)
            .map_err(|e| anyhow::anyhow!("hashing password for {}: {}", entry.username, e))?;
        stores.staff
            .insert(StaffAccount {
                id: entry.id,
                username: entry.username,
                full_name: entry.full_name,
                role: entry.role,
                password_hash,
                is_active: entry.is_active,
            })
            .await;
    }

    info!("Seeded {} doctors and {} staff accounts", doctors, staff);
    Ok(())
}
