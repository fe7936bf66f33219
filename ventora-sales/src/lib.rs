pub mod models;
pub mod orchestrator;

pub use models::{
    LineRequest, PaymentTerms, Sale, SaleLine, SaleLineStore, SaleMode, SaleRequest, SaleStatus,
    SaleStore,
};
pub use orchestrator::{SaleCompletionAdapter, SaleError, SaleOrchestrator};
