use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shared_database::DatabaseError;

use crate::models::StaffAccount;
use crate::repository::StaffDirectory;

#[derive(Default)]
pub struct InMemoryStaffDirectory {
    accounts: RwLock<HashMap<String, StaffAccount>>,
}

impl InMemoryStaffDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account. Usernames are matched case-insensitively.
    pub async fn insert(&self, account: StaffAccount) {
        self.accounts
            .write()
            .await
            .insert(account.username.to_lowercase(), account);
    }
}

#[async_trait]
impl StaffDirectory for InMemoryStaffDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<StaffAccount>, DatabaseError> {
        Ok(self.accounts.read().await.get(&username.to_lowercase()).cloned())
    }
}
