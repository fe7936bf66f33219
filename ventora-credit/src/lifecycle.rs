use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    Credit, CreditStatus, CreditStore, DelinquencySummary, Installment, InstallmentStore,
};
use crate::schedule::build_schedule;
use ventora_catalog::pricing;
use ventora_core::audit::append_best_effort;
use ventora_core::{Actor, AuditEvent, AuditSink, CustomerStore, StoreError};

/// Seam back into the sales crate: flips the owning sale to PAID once its
/// credit settles. Implemented over the sale store by the caller.
pub trait SaleCompletion: Send + Sync {
    fn mark_sale_paid(&self, sale_id: Uuid) -> Result<(), StoreError>;
}

/// Terms for opening a credit against a just-registered sale.
#[derive(Debug, Clone)]
pub struct NewCredit {
    pub sale_id: Uuid,
    pub customer_id: Uuid,
    pub financed: f64,
    pub down_payment: f64,
    pub annual_rate: f64,
    pub term_months: u32,
    pub anchor_date: NaiveDate,
}

/// Manages credits from opening through payment, delinquency and
/// cancellation.
pub struct CreditLifecycle {
    credits: Arc<dyn CreditStore>,
    installments: Arc<dyn InstallmentStore>,
    customers: Arc<dyn CustomerStore>,
    sales: Arc<dyn SaleCompletion>,
    audit: Arc<dyn AuditSink>,
}

impl CreditLifecycle {
    pub fn new(
        credits: Arc<dyn CreditStore>,
        installments: Arc<dyn InstallmentStore>,
        customers: Arc<dyn CustomerStore>,
        sales: Arc<dyn SaleCompletion>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            credits,
            installments,
            customers,
            sales,
            audit,
        }
    }

    /// Open a credit and persist its full installment schedule. The opening
    /// balance is the total scheduled amount (installment x term), so the
    /// balance reaches zero exactly when the last installment is paid.
    pub fn open_credit(&self, terms: NewCredit, actor: &Actor) -> Result<Credit, CreditError> {
        let amount = pricing::installment(terms.financed, terms.annual_rate, terms.term_months);
        let opening_balance = pricing::round2(amount * terms.term_months as f64);

        let credit = Credit::new(
            terms.sale_id,
            terms.customer_id,
            terms.financed,
            terms.annual_rate,
            terms.term_months,
            terms.down_payment,
            opening_balance,
        );
        self.credits.add(&credit)?;

        for installment in build_schedule(
            credit.id,
            terms.financed,
            terms.annual_rate,
            terms.term_months,
            terms.anchor_date,
        ) {
            self.installments.add(&installment)?;
        }

        self.adjust_customer_balance(terms.customer_id, opening_balance)?;

        tracing::info!(
            credit_id = %credit.id,
            sale_id = %terms.sale_id,
            financed = terms.financed,
            term_months = terms.term_months,
            "credit opened"
        );
        append_best_effort(
            self.audit.as_ref(),
            AuditEvent::new(
                actor.id,
                "credit.opened",
                credit.id,
                format!(
                    "credit of {:.2} over {} months at {}% for sale {}",
                    terms.financed, terms.term_months, terms.annual_rate, terms.sale_id
                ),
            ),
        );

        Ok(credit)
    }

    /// Apply a payment to a single installment. Decrements the credit
    /// balance by exactly the installment amount; on payoff the credit
    /// becomes PAID and the owning sale follows.
    pub fn pay_installment(
        &self,
        installment_id: Uuid,
        actor: &Actor,
    ) -> Result<Credit, CreditError> {
        let installment = self
            .installments
            .get_by_id(installment_id)?
            .ok_or(CreditError::InstallmentNotFound(installment_id))?;
        if installment.is_paid {
            return Err(CreditError::AlreadyPaid(installment_id));
        }

        let mut credit = self
            .credits
            .get_by_id(installment.credit_id)?
            .ok_or(CreditError::CreditNotFound(installment.credit_id))?;
        if !credit.is_active() {
            return Err(CreditError::NotActive(credit.id, credit.status));
        }

        self.installments.mark_paid(installment_id, Utc::now())?;

        credit.balance = pricing::round2(credit.balance - installment.amount);
        // float residue within half a cent of zero counts as settled
        if credit.balance.abs() < 0.005 {
            credit.balance = 0.0;
        }
        let settled = credit.balance == 0.0;
        if settled {
            credit.status = CreditStatus::Paid;
        }
        self.credits.update(&credit)?;

        self.adjust_customer_balance(credit.customer_id, -installment.amount)?;

        append_best_effort(
            self.audit.as_ref(),
            AuditEvent::new(
                actor.id,
                "installment.paid",
                installment_id,
                format!(
                    "installment {}/{} of {:.2} on credit {}",
                    installment.sequence, credit.term_months, installment.amount, credit.id
                ),
            ),
        );

        if settled {
            self.sales.mark_sale_paid(credit.sale_id)?;
            tracing::info!(credit_id = %credit.id, sale_id = %credit.sale_id, "credit settled");
            append_best_effort(
                self.audit.as_ref(),
                AuditEvent::new(
                    actor.id,
                    "credit.settled",
                    credit.id,
                    format!("all {} installments paid", credit.term_months),
                ),
            );
        }

        Ok(credit)
    }

    /// A credit is delinquent while it is ACTIVE, carries a balance and has
    /// at least one unpaid installment due strictly before today.
    pub fn is_delinquent(&self, credit_id: Uuid) -> Result<bool, CreditError> {
        self.is_delinquent_as_of(credit_id, Utc::now().date_naive())
    }

    pub fn is_delinquent_as_of(
        &self,
        credit_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<bool, CreditError> {
        let credit = self
            .credits
            .get_by_id(credit_id)?
            .ok_or(CreditError::CreditNotFound(credit_id))?;
        if !credit.is_active() || credit.balance <= 0.0 {
            return Ok(false);
        }
        let pending = self.installments.get_pending_by_credit(credit_id)?;
        Ok(pending.iter().any(|i| i.is_overdue(as_of)))
    }

    /// Aggregate view over a customer's ACTIVE credits.
    pub fn delinquency_summary(&self, customer_id: Uuid) -> Result<DelinquencySummary, CreditError> {
        self.delinquency_summary_as_of(customer_id, Utc::now().date_naive())
    }

    pub fn delinquency_summary_as_of(
        &self,
        customer_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<DelinquencySummary, CreditError> {
        let mut summary = DelinquencySummary {
            customer_id,
            active_credits: 0,
            total_financed: 0.0,
            total_pending_balance: 0.0,
            pending_installments: 0,
            overdue_installments: 0,
            is_delinquent: false,
        };

        for credit in self.credits.get_by_customer(customer_id)? {
            if !credit.is_active() {
                continue;
            }
            summary.active_credits += 1;
            summary.total_financed = pricing::round2(summary.total_financed + credit.financed);
            summary.total_pending_balance =
                pricing::round2(summary.total_pending_balance + credit.balance);

            let pending = self.installments.get_pending_by_credit(credit.id)?;
            summary.pending_installments += pending.len();
            summary.overdue_installments +=
                pending.iter().filter(|i| i.is_overdue(as_of)).count();
        }

        summary.is_delinquent = summary.overdue_installments > 0;
        Ok(summary)
    }

    /// Cancel the credit attached to a sale. Paid installments stay paid,
    /// the balance is left as recorded; no further installments are owed.
    pub fn cancel_credit(&self, sale_id: Uuid, actor: &Actor) -> Result<Credit, CreditError> {
        let mut credit = self
            .credits
            .get_by_sale(sale_id)?
            .ok_or(CreditError::NoCreditForSale(sale_id))?;
        if !credit.is_active() {
            return Err(CreditError::NotActive(credit.id, credit.status));
        }

        let remaining = credit.balance;
        credit.status = CreditStatus::Canceled;
        self.credits.update(&credit)?;

        self.adjust_customer_balance(credit.customer_id, -remaining)?;

        tracing::info!(credit_id = %credit.id, sale_id = %sale_id, "credit canceled");
        append_best_effort(
            self.audit.as_ref(),
            AuditEvent::new(
                actor.id,
                "credit.canceled",
                credit.id,
                format!("canceled with {remaining:.2} outstanding"),
            ),
        );

        Ok(credit)
    }

    /// Installments of a credit, ordered by sequence.
    pub fn schedule(&self, credit_id: Uuid) -> Result<Vec<Installment>, CreditError> {
        Ok(self.installments.get_by_credit(credit_id)?)
    }

    fn adjust_customer_balance(&self, customer_id: Uuid, delta: f64) -> Result<(), CreditError> {
        let mut customer = self
            .customers
            .get_by_id(customer_id)?
            .ok_or(CreditError::CustomerNotFound(customer_id))?;
        customer.pending_balance = pricing::round2(customer.pending_balance + delta).max(0.0);
        self.customers.update(&customer)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreditError {
    #[error("credit not found: {0}")]
    CreditNotFound(Uuid),

    #[error("no credit exists for sale {0}")]
    NoCreditForSale(Uuid),

    #[error("installment not found: {0}")]
    InstallmentNotFound(Uuid),

    #[error("installment already paid: {0}")]
    AlreadyPaid(Uuid),

    #[error("credit {0} is {1:?}, expected ACTIVE")]
    NotActive(Uuid, CreditStatus),

    #[error("customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Months};
    use std::collections::HashMap;
    use std::sync::RwLock;
    use ventora_core::{Customer, StoreResult};

    #[derive(Default)]
    struct FakeStores {
        credits: RwLock<HashMap<Uuid, Credit>>,
        installments: RwLock<HashMap<Uuid, Installment>>,
        customers: RwLock<HashMap<Uuid, Customer>>,
        paid_sales: RwLock<Vec<Uuid>>,
        audit: RwLock<Vec<AuditEvent>>,
    }

    impl CreditStore for FakeStores {
        fn add(&self, credit: &Credit) -> StoreResult<()> {
            self.credits.write().unwrap().insert(credit.id, credit.clone());
            Ok(())
        }

        fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Credit>> {
            Ok(self.credits.read().unwrap().get(&id).cloned())
        }

        fn get_by_sale(&self, sale_id: Uuid) -> StoreResult<Option<Credit>> {
            Ok(self
                .credits
                .read()
                .unwrap()
                .values()
                .find(|c| c.sale_id == sale_id)
                .cloned())
        }

        fn get_by_customer(&self, customer_id: Uuid) -> StoreResult<Vec<Credit>> {
            Ok(self
                .credits
                .read()
                .unwrap()
                .values()
                .filter(|c| c.customer_id == customer_id)
                .cloned()
                .collect())
        }

        fn update(&self, credit: &Credit) -> StoreResult<()> {
            self.credits.write().unwrap().insert(credit.id, credit.clone());
            Ok(())
        }
    }

    impl InstallmentStore for FakeStores {
        fn add(&self, installment: &Installment) -> StoreResult<()> {
            self.installments
                .write()
                .unwrap()
                .insert(installment.id, installment.clone());
            Ok(())
        }

        fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Installment>> {
            Ok(self.installments.read().unwrap().get(&id).cloned())
        }

        fn get_by_credit(&self, credit_id: Uuid) -> StoreResult<Vec<Installment>> {
            let mut found: Vec<_> = self
                .installments
                .read()
                .unwrap()
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
            if let Some(installment) = self.installments.write().unwrap().get_mut(&id) {
                installment.is_paid = true;
                installment.paid_at = Some(paid_at);
            }
            Ok(())
        }
    }

    impl CustomerStore for FakeStores {
        fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Customer>> {
            Ok(self.customers.read().unwrap().get(&id).cloned())
        }

        fn update(&self, customer: &Customer) -> StoreResult<()> {
            self.customers
                .write()
                .unwrap()
                .insert(customer.id, customer.clone());
            Ok(())
        }
    }

    impl SaleCompletion for FakeStores {
        fn mark_sale_paid(&self, sale_id: Uuid) -> Result<(), StoreError> {
            self.paid_sales.write().unwrap().push(sale_id);
            Ok(())
        }
    }

    impl AuditSink for FakeStores {
        fn append(&self, event: AuditEvent) -> StoreResult<()> {
            self.audit.write().unwrap().push(event);
            Ok(())
        }
    }

    fn setup() -> (Arc<FakeStores>, CreditLifecycle, Customer, Actor) {
        let stores = Arc::new(FakeStores::default());
        let customer = Customer::new("Maria Lopez");
        CustomerStore::update(&*stores, &customer).unwrap();
        let lifecycle = CreditLifecycle::new(
            stores.clone(),
            stores.clone(),
            stores.clone(),
            stores.clone(),
            stores.clone(),
        );
        (stores, lifecycle, customer, Actor::new("cashier"))
    }

    fn terms(customer_id: Uuid, financed: f64, annual_rate: f64, term_months: u32) -> NewCredit {
        NewCredit {
            sale_id: Uuid::new_v4(),
            customer_id,
            financed,
            down_payment: 0.0,
            annual_rate,
            term_months,
            anchor_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_open_credit_persists_full_schedule() {
        let (stores, lifecycle, customer, actor) = setup();

        let credit = lifecycle
            .open_credit(terms(customer.id, 1200.0, 0.0, 12), &actor)
            .unwrap();

        assert_eq!(credit.status, CreditStatus::Active);
        assert_eq!(credit.balance, 1200.0);
        assert_eq!(lifecycle.schedule(credit.id).unwrap().len(), 12);

        let stored_customer = CustomerStore::get_by_id(&*stores, customer.id).unwrap().unwrap();
        assert_eq!(stored_customer.pending_balance, 1200.0);
    }

    #[test]
    fn test_paying_every_installment_settles_credit_and_sale() {
        let (stores, lifecycle, customer, actor) = setup();
        let credit_terms = terms(customer.id, 833.0, 5.0, 12);
        let sale_id = credit_terms.sale_id;
        let credit = lifecycle.open_credit(credit_terms, &actor).unwrap();

        for installment in lifecycle.schedule(credit.id).unwrap() {
            lifecycle.pay_installment(installment.id, &actor).unwrap();
        }

        let settled = CreditStore::get_by_id(&*stores, credit.id).unwrap().unwrap();
        assert_eq!(settled.balance, 0.0);
        assert_eq!(settled.status, CreditStatus::Paid);
        assert_eq!(stores.paid_sales.read().unwrap().as_slice(), &[sale_id]);
        assert!(!lifecycle.is_delinquent(credit.id).unwrap());
    }

    #[test]
    fn test_paying_twice_fails_without_state_change() {
        let (stores, lifecycle, customer, actor) = setup();
        let credit = lifecycle
            .open_credit(terms(customer.id, 1200.0, 0.0, 12), &actor)
            .unwrap();
        let first = lifecycle.schedule(credit.id).unwrap().remove(0);

        lifecycle.pay_installment(first.id, &actor).unwrap();
        let balance_after = CreditStore::get_by_id(&*stores, credit.id).unwrap().unwrap().balance;

        let err = lifecycle.pay_installment(first.id, &actor).unwrap_err();
        assert!(matches!(err, CreditError::AlreadyPaid(id) if id == first.id));
        assert_eq!(
            CreditStore::get_by_id(&*stores, credit.id).unwrap().unwrap().balance,
            balance_after
        );
    }

    #[test]
    fn test_overdue_installment_makes_credit_delinquent() {
        let (_stores, lifecycle, customer, actor) = setup();
        let credit = lifecycle
            .open_credit(terms(customer.id, 1200.0, 0.0, 12), &actor)
            .unwrap();
        let schedule = lifecycle.schedule(credit.id).unwrap();
        let first_due = schedule[0].due_date;

        // on the due date itself nothing is overdue yet (strictly-before rule)
        assert!(!lifecycle.is_delinquent_as_of(credit.id, first_due).unwrap());

        // a month later the first installment is overdue
        let after = first_due.checked_add_months(Months::new(1)).unwrap();
        assert!(lifecycle.is_delinquent_as_of(credit.id, after).unwrap());

        // paying it clears the delinquency
        lifecycle.pay_installment(schedule[0].id, &actor).unwrap();
        assert!(!lifecycle.is_delinquent_as_of(credit.id, after).unwrap());
    }

    #[test]
    fn test_cancel_leaves_paid_installments_and_clears_customer_balance() {
        let (stores, lifecycle, customer, actor) = setup();
        let credit_terms = terms(customer.id, 1200.0, 0.0, 12);
        let sale_id = credit_terms.sale_id;
        let credit = lifecycle.open_credit(credit_terms, &actor).unwrap();
        let first = lifecycle.schedule(credit.id).unwrap().remove(0);
        lifecycle.pay_installment(first.id, &actor).unwrap();

        let canceled = lifecycle.cancel_credit(sale_id, &actor).unwrap();
        assert_eq!(canceled.status, CreditStatus::Canceled);
        // balance left as recorded at cancellation time
        assert_eq!(canceled.balance, 1100.0);
        // paid installment stays paid
        let schedule = lifecycle.schedule(credit.id).unwrap();
        assert!(schedule[0].is_paid);
        // customer owes nothing further
        let stored_customer = CustomerStore::get_by_id(&*stores, customer.id).unwrap().unwrap();
        assert_eq!(stored_customer.pending_balance, 0.0);
        // delinquency gone regardless of due dates
        let far_future = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(!lifecycle.is_delinquent_as_of(credit.id, far_future).unwrap());

        let err = lifecycle.cancel_credit(sale_id, &actor).unwrap_err();
        assert!(matches!(err, CreditError::NotActive(_, CreditStatus::Canceled)));
    }

    #[test]
    fn test_delinquency_summary_aggregates_active_credits() {
        let (_stores, lifecycle, customer, actor) = setup();
        let first = lifecycle
            .open_credit(terms(customer.id, 1200.0, 0.0, 12), &actor)
            .unwrap();
        lifecycle
            .open_credit(terms(customer.id, 600.0, 0.0, 6), &actor)
            .unwrap();

        let before_due = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let summary = lifecycle
            .delinquency_summary_as_of(customer.id, before_due)
            .unwrap();
        assert_eq!(summary.active_credits, 2);
        assert_eq!(summary.total_financed, 1800.0);
        assert_eq!(summary.total_pending_balance, 1800.0);
        assert_eq!(summary.pending_installments, 18);
        assert_eq!(summary.overdue_installments, 0);
        assert!(!summary.is_delinquent);

        // two months later both credits have an overdue installment
        let later = NaiveDate::from_ymd_opt(2026, 5, 15).unwrap();
        let summary = lifecycle
            .delinquency_summary_as_of(customer.id, later)
            .unwrap();
        assert!(summary.overdue_installments >= 2);
        assert!(summary.is_delinquent);

        // canceling a credit drops it from the aggregate
        lifecycle.cancel_credit(first.sale_id, &actor).unwrap();
        let summary = lifecycle
            .delinquency_summary_as_of(customer.id, later)
            .unwrap();
        assert_eq!(summary.active_credits, 1);
        assert_eq!(summary.total_financed, 600.0);
    }
}
