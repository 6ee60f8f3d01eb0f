//! User repository: the PostgreSQL-backed identity directory.

use async_trait::async_trait;
use sqlx::PgPool;

use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_core::types::UserId;
use cloudvault_entity::user::{UserAccount, UserRole};

use crate::store::UserDirectory;

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account.
    pub async fn create(&self, email: &str, name: &str, role: UserRole) -> AppResult<UserAccount> {
        let email = UserAccount::normalize_email(email);
        sqlx::query_as::<_, UserAccount>(
            "INSERT INTO users (id, email, name, role) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(UserId::new())
        .bind(&email)
        .bind(name)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
                AppError::validation(format!("Email '{email}' is already registered"))
            }
            _ => AppError::with_source(ErrorKind::Identity, "Failed to create user", e),
        })
    }

    /// List all accounts, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<UserAccount>> {
        sqlx::query_as::<_, UserAccount>("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Identity, "Failed to list users", e))
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserAccount>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Identity, "Failed to find user", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserAccount>("SELECT * FROM users WHERE email = $1")
            .bind(UserAccount::normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Identity, "Failed to find user by email", e)
            })
    }
}
