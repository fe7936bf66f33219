use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use ventora_core::{StoreError, StoreResult};

/// Per-product quantity record, keyed by product id. The single source of
/// truth for stock; nothing else stores a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    pub product_id: Uuid,
    pub current: i64,
    /// At or below this the product should be replenished.
    pub min_threshold: i64,
    /// Above this the product is overstocked. Alerting bound, not enforced.
    pub max_threshold: i64,
}

impl StockEntry {
    pub fn new(product_id: Uuid, current: i64, min_threshold: i64, max_threshold: i64) -> Self {
        Self {
            product_id,
            current,
            min_threshold,
            max_threshold,
        }
    }
}

/// Stock record access.
pub trait StockStore: Send + Sync {
    fn get_by_product(&self, product_id: Uuid) -> StoreResult<Option<StockEntry>>;

    fn add(&self, entry: &StockEntry) -> StoreResult<()>;

    fn update(&self, entry: &StockEntry) -> StoreResult<()>;

    /// Persist `entry` only while the stored current quantity still equals
    /// `expected_current`. `Ok(false)` means another movement got there
    /// first and the caller should re-read.
    fn update_if_current(&self, entry: &StockEntry, expected_current: i64) -> StoreResult<bool>;

    fn remove_by_product(&self, product_id: Uuid) -> StoreResult<()>;
}

/// Quantity ledger over a stock store. Movements validate against a fresh
/// read and commit with a compare-and-set on the quantity; when another
/// movement lands in between, the ledger re-reads and revalidates, so two
/// racing exits can never consume the same units. A failed validation
/// leaves the record untouched.
pub struct StockLedger {
    store: Arc<dyn StockStore>,
}

impl StockLedger {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self { store }
    }

    fn entry(&self, product_id: Uuid) -> Result<StockEntry, StockError> {
        self.store
            .get_by_product(product_id)?
            .ok_or(StockError::NotTracked(product_id))
    }

    /// Current quantity on hand.
    pub fn available(&self, product_id: Uuid) -> Result<i64, StockError> {
        Ok(self.entry(product_id)?.current)
    }

    /// Goods coming in. Quantity must be positive; the increase itself is
    /// unconditional.
    pub fn register_entry(&self, product_id: Uuid, quantity: i64) -> Result<(), StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }
        loop {
            let mut entry = self.entry(product_id)?;
            let expected = entry.current;
            entry.current += quantity;
            if self.store.update_if_current(&entry, expected)? {
                return Ok(());
            }
        }
    }

    /// Goods going out. Succeeds only while the result stays non-negative.
    pub fn register_exit(&self, product_id: Uuid, quantity: i64) -> Result<(), StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity(quantity));
        }
        loop {
            let mut entry = self.entry(product_id)?;
            if entry.current < quantity {
                return Err(StockError::Insufficient {
                    product_id,
                    requested: quantity,
                    available: entry.current,
                });
            }
            let expected = entry.current;
            entry.current -= quantity;
            if self.store.update_if_current(&entry, expected)? {
                return Ok(());
            }
        }
    }

    pub fn needs_replenishment(&self, product_id: Uuid) -> Result<bool, StockError> {
        let entry = self.entry(product_id)?;
        Ok(entry.current <= entry.min_threshold)
    }

    pub fn is_overstocked(&self, product_id: Uuid) -> Result<bool, StockError> {
        let entry = self.entry(product_id)?;
        Ok(entry.current > entry.max_threshold)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("no stock entry for product {0}")]
    NotTracked(Uuid),

    #[error("stock movement quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    Insufficient {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
