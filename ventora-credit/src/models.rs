use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ventora_core::StoreResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    Active,
    Paid,
    Canceled,
}

/// An installment credit backing exactly one CREDIT-mode sale.
///
/// `financed` is the amortized principal (sale total minus down payment).
/// `balance` is the outstanding scheduled amount, installment x term at
/// opening, so it hits zero exactly when the last installment is paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credit {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub customer_id: Uuid,
    pub financed: f64,
    /// Annual rate in percent, e.g. 5.0 for 5%.
    pub annual_rate: f64,
    pub term_months: u32,
    pub down_payment: f64,
    pub balance: f64,
    pub status: CreditStatus,
    pub created_at: DateTime<Utc>,
}

impl Credit {
    pub fn new(
        sale_id: Uuid,
        customer_id: Uuid,
        financed: f64,
        annual_rate: f64,
        term_months: u32,
        down_payment: f64,
        opening_balance: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sale_id,
            customer_id,
            financed,
            annual_rate,
            term_months,
            down_payment,
            balance: opening_balance,
            status: CreditStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CreditStatus::Active
    }
}

/// One scheduled payment of a credit. Sequence runs 1..=term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub id: Uuid,
    pub credit_id: Uuid,
    pub sequence: u32,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_paid: bool,
}

impl Installment {
    pub fn new(credit_id: Uuid, sequence: u32, amount: f64, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            credit_id,
            sequence,
            amount,
            due_date,
            paid_at: None,
            is_paid: false,
        }
    }

    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        !self.is_paid && self.due_date < as_of
    }
}

/// Per-customer aggregate over ACTIVE credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelinquencySummary {
    pub customer_id: Uuid,
    pub active_credits: usize,
    pub total_financed: f64,
    pub total_pending_balance: f64,
    pub pending_installments: usize,
    pub overdue_installments: usize,
    pub is_delinquent: bool,
}

/// Credit record access.
pub trait CreditStore: Send + Sync {
    fn add(&self, credit: &Credit) -> StoreResult<()>;

    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Credit>>;

    fn get_by_sale(&self, sale_id: Uuid) -> StoreResult<Option<Credit>>;

    fn get_by_customer(&self, customer_id: Uuid) -> StoreResult<Vec<Credit>>;

    fn update(&self, credit: &Credit) -> StoreResult<()>;
}

/// Installment record access. Listings come back ordered by sequence.
pub trait InstallmentStore: Send + Sync {
    fn add(&self, installment: &Installment) -> StoreResult<()>;

    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Installment>>;

    fn get_by_credit(&self, credit_id: Uuid) -> StoreResult<Vec<Installment>>;

    fn get_pending_by_credit(&self, credit_id: Uuid) -> StoreResult<Vec<Installment>>;

    fn mark_paid(&self, id: Uuid, paid_at: DateTime<Utc>) -> StoreResult<()>;
}
