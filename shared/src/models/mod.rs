//! Domain models for the Depot inventory platform

mod dashboard;
mod document;
mod ledger;
mod product;
mod stock_level;
mod transfer;
mod user;
mod warehouse;

pub use dashboard::*;
pub use document::*;
pub use ledger::*;
pub use product::*;
pub use stock_level::*;
pub use transfer::*;
pub use user::*;
pub use warehouse::*;
