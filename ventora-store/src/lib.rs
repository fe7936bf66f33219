pub mod app_config;
pub mod audit;
pub mod engine;
pub mod memory;

pub use app_config::VentoraConfig;
pub use audit::{MemoryAuditSink, TracingAuditSink};
pub use engine::SaleEngine;
pub use memory::{
    MemoryCreditStore, MemoryCustomerStore, MemoryInstallmentStore, MemoryProductStore,
    MemorySaleLineStore, MemorySaleStore, MemoryStockStore,
};
