use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::models::{DoctorError, DoctorProfile};
use crate::repository::DoctorDirectory;

pub struct DoctorProfileService {
    directory: Arc<dyn DoctorDirectory>,
}

impl DoctorProfileService {
    pub fn new(directory: Arc<dyn DoctorDirectory>) -> Self {
        Self { directory }
    }

    /// Profile of a doctor who is currently taking appointments.
    pub async fn bookable_doctor(&self, doctor_id: Uuid) -> Result<DoctorProfile, DoctorError> {
        let profile = self.directory
            .get_doctor(doctor_id)
            .await?
            .ok_or(DoctorError::DoctorNotFound(doctor_id))?;

        if !profile.is_active {
            warn!("Booking attempted for inactive doctor {}", doctor_id);
            return Err(DoctorError::DoctorInactive(doctor_id));
        }

        if !profile.consultation_fee.is_finite() || profile.consultation_fee < 0.0 {
            return Err(DoctorError::ValidationError(format!(
                "Doctor {} has an invalid consultation fee",
                doctor_id
            )));
        }

        Ok(profile)
    }
}
