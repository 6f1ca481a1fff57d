//! Data models shared across the pipeline.

pub mod config;
pub mod event;
pub mod expense;
pub mod invoice;
