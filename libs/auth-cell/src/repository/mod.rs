use async_trait::async_trait;

use shared_database::DatabaseError;

use crate::models::StaffAccount;

pub mod memory;
pub mod supabase;

pub use memory::InMemoryStaffDirectory;
pub use supabase::SupabaseStaffDirectory;

/// Lookup of staff accounts by login name.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<StaffAccount>, DatabaseError>;
}
