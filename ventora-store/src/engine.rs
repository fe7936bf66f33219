use std::sync::Arc;

use crate::app_config::{BusinessRules, VentoraConfig};
use crate::memory::{
    MemoryCreditStore, MemoryCustomerStore, MemoryInstallmentStore, MemoryProductStore,
    MemorySaleLineStore, MemorySaleStore, MemoryStockStore,
};
use ventora_catalog::{Product, ProductStore, StockEntry, StockLedger, StockStore};
use ventora_core::{AuditSink, StoreResult};
use ventora_credit::CreditLifecycle;
use ventora_sales::{SaleCompletionAdapter, SaleOrchestrator};

/// A fully wired in-memory deployment: memory stores behind every
/// collaborator trait, business rules taken from configuration. The
/// stores are exposed so callers can seed data and inspect state.
pub struct SaleEngine {
    pub products: Arc<MemoryProductStore>,
    pub stock: Arc<MemoryStockStore>,
    pub sales: Arc<MemorySaleStore>,
    pub lines: Arc<MemorySaleLineStore>,
    pub customers: Arc<MemoryCustomerStore>,
    pub credits: Arc<MemoryCreditStore>,
    pub installments: Arc<MemoryInstallmentStore>,
    pub orchestrator: SaleOrchestrator,
    pub lifecycle: CreditLifecycle,
    rules: BusinessRules,
}

impl SaleEngine {
    pub fn new(rules: BusinessRules, audit: Arc<dyn AuditSink>) -> Self {
        let products = Arc::new(MemoryProductStore::new());
        let stock = Arc::new(MemoryStockStore::new());
        let sales = Arc::new(MemorySaleStore::new());
        let lines = Arc::new(MemorySaleLineStore::new());
        let customers = Arc::new(MemoryCustomerStore::new());
        let credits = Arc::new(MemoryCreditStore::new());
        let installments = Arc::new(MemoryInstallmentStore::new());

        let completion = Arc::new(SaleCompletionAdapter::new(sales.clone()));
        let lifecycle = CreditLifecycle::new(
            credits.clone(),
            installments.clone(),
            customers.clone(),
            completion.clone(),
            audit.clone(),
        );
        let orchestrator = SaleOrchestrator::new(
            products.clone(),
            StockLedger::new(stock.clone()),
            sales.clone(),
            lines.clone(),
            customers.clone(),
            CreditLifecycle::new(
                credits.clone(),
                installments.clone(),
                customers.clone(),
                completion,
                audit.clone(),
            ),
            audit,
            rules.tax_rate,
        )
        .with_term_cap(rules.max_term_months);

        Self {
            products,
            stock,
            sales,
            lines,
            customers,
            credits,
            installments,
            orchestrator,
            lifecycle,
            rules,
        }
    }

    pub fn from_config(config: &VentoraConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self::new(config.business_rules.clone(), audit)
    }

    /// Register a product and start tracking its stock with the configured
    /// replenishment thresholds.
    pub fn track_product(&self, product: &Product, initial_quantity: i64) -> StoreResult<()> {
        self.products.update(product)?;
        self.stock.add(&StockEntry::new(
            product.id,
            initial_quantity,
            self.rules.stock_min_threshold,
            self.rules.stock_max_threshold,
        ))
    }
}
