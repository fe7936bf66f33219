use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ventora_catalog::pricing::LineTotals;
use ventora_core::StoreResult;

/// Sale lifecycle. REGISTERED is the only non-terminal state; a sale moves
/// to PAID or CANCELED exactly once and never leaves either.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Registered,
    Paid,
    Canceled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleMode {
    Cash,
    Credit,
}

/// Sale header. Monetary fields are sums of the already-rounded line
/// figures, so they match the lines to the cent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Uuid,
    pub seller_id: Uuid,
    pub date: DateTime<Utc>,
    pub mode: SaleMode,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub down_payment: f64,
    pub term_months: u32,
    pub status: SaleStatus,
}

impl Sale {
    pub fn new(customer_id: Uuid, seller_id: Uuid, mode: SaleMode) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            code: generate_code(&id),
            customer_id,
            seller_id,
            date: Utc::now(),
            mode,
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            down_payment: 0.0,
            term_months: 0,
            status: SaleStatus::Registered,
        }
    }
}

/// Format: VTA-{timestamp}-{short_uuid}
fn generate_code(sale_id: &Uuid) -> String {
    let timestamp = Utc::now().timestamp();
    let short_id = &sale_id.to_string()[..8];
    format!("VTA-{}-{}", timestamp, short_id.to_uppercase())
}

/// One product position on a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl SaleLine {
    pub fn new(
        sale_id: Uuid,
        product_id: Uuid,
        quantity: i64,
        unit_price: f64,
        totals: LineTotals,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sale_id,
            product_id,
            quantity,
            unit_price,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
        }
    }
}

/// Incoming sale request as assembled at the counter.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleRequest {
    pub customer_id: Uuid,
    pub seller_id: Uuid,
    pub lines: Vec<LineRequest>,
    pub payment: PaymentTerms,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTerms {
    Cash,
    Credit {
        down_payment: f64,
        term_months: u32,
        annual_rate: f64,
    },
}

/// Sale header access. `add` returns the identity the sale was persisted
/// under.
pub trait SaleStore: Send + Sync {
    fn add(&self, sale: &Sale) -> StoreResult<Uuid>;

    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Sale>>;

    fn update(&self, sale: &Sale) -> StoreResult<()>;
}

/// Sale line access.
pub trait SaleLineStore: Send + Sync {
    fn add(&self, line: &SaleLine) -> StoreResult<()>;

    fn get_by_sale(&self, sale_id: Uuid) -> StoreResult<Vec<SaleLine>>;
}
