//! Convenience result type alias for CloudVault.

use crate::error::AppError;

/// A specialized `Result` type for CloudVault operations.
pub type AppResult<T> = Result<T, AppError>;
