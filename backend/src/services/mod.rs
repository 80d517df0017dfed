//! Business logic services for the Depot inventory service

pub mod auth;
pub mod dashboard;
pub mod delivery;
mod documents;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ledger;
pub mod product;
pub mod receipt;
pub mod stock;
pub mod transfer;
pub mod warehouse;

pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use delivery::DeliveryService;
pub use ledger::LedgerService;
pub use product::ProductService;
pub use receipt::ReceiptService;
pub use stock::StockService;
pub use transfer::TransferService;
pub use warehouse::WarehouseService;
