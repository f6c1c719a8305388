//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a store.
//!
//! # Tasks
//! - TTL Sweep: Reclaims expired entries once per TTL interval

mod cleanup;

pub use cleanup::{spawn_sweep_task, Sweep};
