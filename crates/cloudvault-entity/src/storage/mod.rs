//! Storage accounting value objects.

pub mod quota;
pub mod stats;

pub use quota::StorageQuota;
pub use stats::{CategoryUsage, FileCategory, StorageStats, UsageBreakdown};
