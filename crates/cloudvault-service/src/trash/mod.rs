//! Trash, restore, permanent deletion and the retention sweep.

pub mod service;
pub mod sweeper;

pub use service::{TrashListing, TrashService};
pub use sweeper::{SweepReport, TrashSweeper};
