//! Built-in job handler implementations.

pub mod trash_sweep;

pub use trash_sweep::TrashSweepJobHandler;
