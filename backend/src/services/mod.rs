//! Business logic services for the SMB ERP backend

pub mod client;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod stock;
pub mod supplier;

pub use client::ClientService;
pub use product::ProductService;
pub use purchase::PurchaseService;
pub use sale::SaleService;
pub use stock::StockService;
pub use supplier::SupplierService;
