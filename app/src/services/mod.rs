//! Batch rendering services.

pub mod batch;
pub mod export;
pub mod job;
