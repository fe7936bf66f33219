pub mod pricing;
pub mod product;
pub mod stock;

pub use product::{Product, ProductStore};
pub use stock::{StockEntry, StockError, StockLedger, StockStore};
