//! Database models for the Depot inventory service
//!
//! Re-exports the domain models from the shared crate

pub use shared::models::*;
