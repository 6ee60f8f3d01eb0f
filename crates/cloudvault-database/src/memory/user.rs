//! In-memory identity directory.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::UserId;
use cloudvault_entity::user::{UserAccount, UserRole};

use crate::store::UserDirectory;

/// User accounts held in a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<DashMap<UserId, UserAccount>>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active account with the `user` role.
    pub fn register(&self, email: &str, name: &str) -> UserAccount {
        let account = UserAccount {
            id: UserId::new(),
            email: UserAccount::normalize_email(email),
            name: name.to_string(),
            role: UserRole::User,
            is_active: true,
            created_at: Utc::now(),
        };
        self.users.insert(account.id, account.clone());
        account
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let email = UserAccount::normalize_email(email);
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }
}
