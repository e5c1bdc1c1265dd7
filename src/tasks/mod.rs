//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Prune: Removes expired cache entries at configured intervals

mod prune;

pub use prune::spawn_prune_task;
