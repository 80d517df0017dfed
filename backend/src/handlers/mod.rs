//! HTTP handlers

pub mod auth;
pub mod dashboard;
pub mod delivery;
pub mod health;
pub mod ledger;
pub mod product;
pub mod receipt;
pub mod stock;
pub mod transfer;
pub mod warehouse;

pub use auth::*;
pub use dashboard::*;
pub use delivery::*;
pub use health::*;
pub use ledger::*;
pub use product::*;
pub use receipt::*;
pub use stock::*;
pub use transfer::*;
pub use warehouse::*;
