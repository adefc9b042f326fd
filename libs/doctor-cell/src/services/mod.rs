pub mod availability;
pub mod directory;
pub mod schedule;

pub use availability::AvailabilityResolver;
pub use directory::DoctorProfileService;
pub use schedule::ScheduleService;
