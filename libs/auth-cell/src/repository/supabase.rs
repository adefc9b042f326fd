use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::StaffAccount;
use crate::repository::StaffDirectory;

const USERS: &str = "/rest/v1/users";

pub struct SupabaseStaffDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseStaffDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl StaffDirectory for SupabaseStaffDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<StaffAccount>, DatabaseError> {
        // Usernames are stored lowercase.
        let username = username.to_lowercase();
        let path = format!(
            "{}?username=eq.{}&select=id,username,full_name,role,password_hash,is_active&limit=1",
            USERS,
            urlencoding::encode(&username)
        );

        let rows: Vec<StaffAccount> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }
}
