pub mod booking;
pub mod lifecycle;
pub mod tokens;

pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use tokens::{SlotGuard, TokenAllocator};
