use std::sync::Arc;

use tracing::info;

use appointment_cell::models::BookingPolicy;
use appointment_cell::repository::{AppointmentLedger, InMemoryAppointmentLedger, SupabaseAppointmentLedger};
use appointment_cell::services::AppointmentBookingService;
use appointment_cell::AppointmentState;
use auth_cell::repository::{InMemoryStaffDirectory, StaffDirectory, SupabaseStaffDirectory};
use auth_cell::services::AuthService;
use auth_cell::AuthState;
use doctor_cell::repository::{
    DoctorDirectory, InMemoryDoctorDirectory, InMemoryScheduleRepository, ScheduleRepository,
    SupabaseDoctorDirectory, SupabaseScheduleRepository,
};
use doctor_cell::services::{AvailabilityResolver, DoctorProfileService, ScheduleService};
use doctor_cell::DoctorState;
use shared_config::{AppConfig, StorageBackend};
use shared_database::SupabaseClient;

/// In-process tables, kept so the seed loader can populate them.
pub struct MemoryStores {
    pub doctors: Arc<InMemoryDoctorDirectory>,
    pub staff: Arc<InMemoryStaffDirectory>,
}

pub struct AppState {
    pub auth: AuthState,
    pub doctors: DoctorState,
    pub appointments: AppointmentState,
    pub memory: Option<MemoryStores>,
}

struct Stores {
    schedules: Arc<dyn ScheduleRepository>,
    doctors: Arc<dyn DoctorDirectory>,
    staff: Arc<dyn StaffDirectory>,
    ledger: Arc<dyn AppointmentLedger>,
    memory: Option<MemoryStores>,
}

fn stores(config: &AppConfig) -> Stores {
    match config.storage_backend {
        StorageBackend::Supabase => {
            info!("Using PostgREST storage at {}", config.supabase_url);
            let supabase = Arc::new(SupabaseClient::new(config));
            Stores {
                schedules: Arc::new(SupabaseScheduleRepository::new(supabase.clone())),
                doctors: Arc::new(SupabaseDoctorDirectory::new(supabase.clone())),
                staff: Arc::new(SupabaseStaffDirectory::new(supabase.clone())),
                ledger: Arc::new(SupabaseAppointmentLedger::new(supabase)),
                memory: None,
            }
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            let doctors = Arc::new(InMemoryDoctorDirectory::new());
            let staff = Arc::new(InMemoryStaffDirectory::new());
            Stores {
                schedules: Arc::new(InMemoryScheduleRepository::new()),
                doctors: doctors.clone(),
                staff: staff.clone(),
                ledger: Arc::new(InMemoryAppointmentLedger::new()),
                memory: Some(MemoryStores { doctors, staff }),
            }
        }
    }
}

/// Wire every service once, at startup.
pub fn build(config: Arc<AppConfig>) -> AppState {
    let stores = stores(&config);

    let availability = Arc::new(AvailabilityResolver::new(stores.schedules.clone()));
    let schedules = Arc::new(ScheduleService::new(stores.schedules, config.schedule_range_max_days));
    let profiles = Arc::new(DoctorProfileService::new(stores.doctors));

    let booking = Arc::new(AppointmentBookingService::new(
        availability.clone(),
        profiles,
        stores.ledger,
        BookingPolicy::from(config.as_ref()),
    ));

    AppState {
        auth: AuthState {
            config: config.clone(),
            auth: Arc::new(AuthService::new(config.clone(), stores.staff)),
        },
        doctors: DoctorState {
            config: config.clone(),
            schedules,
            availability,
        },
        appointments: AppointmentState {
            config,
            booking,
        },
        memory: stores.memory,
    }
}
