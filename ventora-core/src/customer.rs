use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::StoreResult;

/// A retail customer. `pending_balance` aggregates the outstanding balance
/// of the customer's active credits and is maintained by the credit
/// lifecycle, never recomputed from scratch on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub pending_balance: f64,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            pending_balance: 0.0,
        }
    }
}

/// Customer data access.
pub trait CustomerStore: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>>;

    fn update(&self, customer: &Customer) -> StoreResult<()>;
}
