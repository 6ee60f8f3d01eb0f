//! Request context carrying the authenticated actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudvault_core::types::UserId;
use cloudvault_entity::user::{UserAccount, UserRole};

/// The actor of one operation, as supplied by the identity collaborator.
///
/// Trusted as given; the drive performs no authentication of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The actor's ID.
    pub user_id: UserId,
    /// The actor's email.
    pub email: String,
    /// The actor's system role.
    pub role: UserRole,
    /// When the request was received. Used as the trash timestamp.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(user_id: UserId, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            request_time: Utc::now(),
        }
    }

    /// Creates a context for a directory account.
    pub fn for_account(account: &UserAccount) -> Self {
        Self::new(account.id, account.email.clone(), account.role)
    }

    /// Returns whether the actor is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
