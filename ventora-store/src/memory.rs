//! In-memory store implementations. One `RwLock<HashMap>` per entity,
//! suitable for tests and single-process deployments; durability is the
//! caller's problem.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use ventora_catalog::{Product, ProductStore, StockEntry, StockStore};
use ventora_core::{Customer, CustomerStore, StoreError, StoreResult};
use ventora_credit::{Credit, CreditStore, Installment, InstallmentStore};
use ventora_sales::{Sale, SaleLine, SaleLineStore, SaleStore};

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("store lock poisoned".into()))
}

/// Products keyed by id. `update` is an upsert, which doubles as the way
/// to seed the catalog.
#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductStore for MemoryProductStore {
    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(read(&self.products)?.get(&id).cloned())
    }

    fn get_by_code(&self, code: &str) -> StoreResult<Option<Product>> {
        Ok(read(&self.products)?
            .values()
            .find(|p| p.code == code)
            .cloned())
    }

    fn update(&self, product: &Product) -> StoreResult<()> {
        write(&self.products)?.insert(product.id, product.clone());
        Ok(())
    }
}

/// Stock entries keyed by product id.
#[derive(Default)]
pub struct MemoryStockStore {
    entries: RwLock<HashMap<Uuid, StockEntry>>,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockStore for MemoryStockStore {
    fn get_by_product(&self, product_id: Uuid) -> StoreResult<Option<StockEntry>> {
        Ok(read(&self.entries)?.get(&product_id).cloned())
    }

    fn add(&self, entry: &StockEntry) -> StoreResult<()> {
        let mut entries = write(&self.entries)?;
        if entries.contains_key(&entry.product_id) {
            return Err(StoreError::Conflict(format!(
                "stock entry for product {} already exists",
                entry.product_id
            )));
        }
        entries.insert(entry.product_id, entry.clone());
        Ok(())
    }

    fn update(&self, entry: &StockEntry) -> StoreResult<()> {
        write(&self.entries)?.insert(entry.product_id, entry.clone());
        Ok(())
    }

    fn update_if_current(&self, entry: &StockEntry, expected_current: i64) -> StoreResult<bool> {
        let mut entries = write(&self.entries)?;
        match entries.get_mut(&entry.product_id) {
            Some(existing) if existing.current == expected_current => {
                *existing = entry.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove_by_product(&self, product_id: Uuid) -> StoreResult<()> {
        write(&self.entries)?.remove(&product_id);
        Ok(())
    }
}

/// Customers keyed by id. `update` is an upsert.
#[derive(Default)]
pub struct MemoryCustomerStore {
    customers: RwLock<HashMap<Uuid, Customer>>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CustomerStore for MemoryCustomerStore {
    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>> {
        Ok(read(&self.customers)?.get(&id).cloned())
    }

    fn update(&self, customer: &Customer) -> StoreResult<()> {
        write(&self.customers)?.insert(customer.id, customer.clone());
        Ok(())
    }
}

/// Sale headers keyed by id.
#[derive(Default)]
pub struct MemorySaleStore {
    sales: RwLock<HashMap<Uuid, Sale>>,
}

impl MemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaleStore for MemorySaleStore {
    fn add(&self, sale: &Sale) -> StoreResult<Uuid> {
        let mut sales = write(&self.sales)?;
        if sales.contains_key(&sale.id) {
            return Err(StoreError::Conflict(format!(
                "sale {} already exists",
                sale.id
            )));
        }
        sales.insert(sale.id, sale.clone());
        Ok(sale.id)
    }

    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Sale>> {
        Ok(read(&self.sales)?.get(&id).cloned())
    }

    fn update(&self, sale: &Sale) -> StoreResult<()> {
        write(&self.sales)?.insert(sale.id, sale.clone());
        Ok(())
    }
}

/// Sale lines, append-only.
#[derive(Default)]
pub struct MemorySaleLineStore {
    lines: RwLock<Vec<SaleLine>>,
}

impl MemorySaleLineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaleLineStore for MemorySaleLineStore {
    fn add(&self, line: &SaleLine) -> StoreResult<()> {
        write(&self.lines)?.push(line.clone());
        Ok(())
    }

    fn get_by_sale(&self, sale_id: Uuid) -> StoreResult<Vec<SaleLine>> {
        Ok(read(&self.lines)?
            .iter()
            .filter(|l| l.sale_id == sale_id)
            .cloned()
            .collect())
    }
}

/// Credits keyed by id; lookups by sale and customer scan.
#[derive(Default)]
pub struct MemoryCreditStore {
    credits: RwLock<HashMap<Uuid, Credit>>,
}

impl MemoryCreditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CreditStore for MemoryCreditStore {
    fn add(&self, credit: &Credit) -> StoreResult<()> {
        let mut credits = write(&self.credits)?;
        if credits.values().any(|c| c.sale_id == credit.sale_id) {
            return Err(StoreError::Conflict(format!(
                "sale {} already has a credit",
                credit.sale_id
            )));
        }
        credits.insert(credit.id, credit.clone());
        Ok(())
    }

    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Credit>> {
        Ok(read(&self.credits)?.get(&id).cloned())
    }

    fn get_by_sale(&self, sale_id: Uuid) -> StoreResult<Option<Credit>> {
        Ok(read(&self.credits)?
            .values()
            .find(|c| c.sale_id == sale_id)
            .cloned())
    }

    fn get_by_customer(&self, customer_id: Uuid) -> StoreResult<Vec<Credit>> {
        Ok(read(&self.credits)?
            .values()
            .filter(|c| c.customer_id == customer_id)
            .cloned()
            .collect())
    }

    fn update(&self, credit: &Credit) -> StoreResult<()> {
        write(&self.credits)?.insert(credit.id, credit.clone());
        Ok(())
    }
}

/// Installments keyed by id; per-credit reads come back ordered by
/// sequence.
#[derive(Default)]
pub struct MemoryInstallmentStore {
    installments: RwLock<HashMap<Uuid, Installment>>,
}

impl MemoryInstallmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstallmentStore for MemoryInstallmentStore {
    fn add(&self, installment: &Installment) -> StoreResult<()> {
        write(&self.installments)?.insert(installment.id, installment.clone());
        Ok(())
    }

    fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Installment>> {
        Ok(read(&self.installments)?.get(&id).cloned())
    }

    fn get_by_credit(&self, credit_id: Uuid) -> StoreResult<Vec<Installment>> {
        let mut found: Vec<_> = read(&self.installments)?
            .values()
            .filter(|i| i.credit_id == credit_id)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.sequence);
        Ok(found)
    }

    fn get_pending_by_credit(&self, credit_id: Uuid) -> StoreResult<Vec<Installment>> {
        let mut found = self.get_by_credit(credit_id)?;
        found.retain(|i| !i.is_paid);
        Ok(found)
    }

    fn mark_paid(&self, id: Uuid, paid_at: DateTime<Utc>) -> StoreResult<()> {
        let mut installments = write(&self.installments)?;
        match installments.get_mut(&id) {
            Some(installment) => {
                installment.is_paid = true;
                installment.paid_at = Some(paid_at);
                Ok(())
            }
            None => Err(StoreError::Backend(format!("installment {id} not found"))),
        }
    }
}
