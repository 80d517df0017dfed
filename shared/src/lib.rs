//! Shared types and models for the Depot inventory platform
//!
//! This crate contains the domain types exchanged between the backend and the
//! browser front end (via WASM), together with the pure stock arithmetic that
//! every stock mutation goes through.

pub mod dashboard;
pub mod filters;
pub mod models;
pub mod stock;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
