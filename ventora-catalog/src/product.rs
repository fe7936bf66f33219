use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ventora_core::StoreResult;

/// Catalog product. Sales reference products, they never own them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Unique short code, the key sellers type at the counter.
    pub code: String,
    pub name: String,
    pub sell_price: f64,
    pub buy_price: f64,
    pub is_active: bool,
}

impl Product {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        sell_price: f64,
        buy_price: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            sell_price,
            buy_price,
            is_active: true,
        }
    }
}

/// Product catalog access.
pub trait ProductStore: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Product>>;

    fn get_by_code(&self, code: &str) -> StoreResult<Option<Product>>;

    fn update(&self, product: &Product) -> StoreResult<()>;
}
