//! User account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudvault_core::types::UserId;

use super::role::UserRole;

/// A registered user as seen by the drive.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    /// Unique user identifier.
    pub id: UserId,
    /// Lower-cased email address; the lookup key for sharing.
    pub email: String,
    /// Display name.
    pub name: String,
    /// System role.
    pub role: UserRole,
    /// Inactive accounts cannot receive new shares.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Normalize an email for lookups.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}
