//! User account entities supplied by the identity directory.

pub mod model;
pub mod role;

pub use model::UserAccount;
pub use role::UserRole;
