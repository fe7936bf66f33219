use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    PaymentTerms, Sale, SaleLine, SaleLineStore, SaleMode, SaleRequest, SaleStatus, SaleStore,
};
use ventora_catalog::pricing::{self, LineTotals};
use ventora_catalog::{Product, ProductStore, StockError, StockLedger};
use ventora_core::audit::append_best_effort;
use ventora_core::{Actor, AuditEvent, AuditSink, CustomerStore, StoreError};
use ventora_credit::{CreditError, CreditLifecycle, NewCredit, SaleCompletion};

/// Top-level entry point for the sales flow: validates a request, prices
/// it, persists the sale with its lines, moves stock, and opens the credit
/// for CREDIT-mode sales.
///
/// Steps after the header is persisted are not compensated on failure;
/// there is no unit-of-work boundary at this layer. Callers needing strict
/// all-or-nothing semantics must provide transactional stores.
pub struct SaleOrchestrator {
    products: Arc<dyn ProductStore>,
    stock: StockLedger,
    sales: Arc<dyn SaleStore>,
    lines: Arc<dyn SaleLineStore>,
    customers: Arc<dyn CustomerStore>,
    credit: CreditLifecycle,
    audit: Arc<dyn AuditSink>,
    tax_rate: f64,
    max_term_months: Option<u32>,
}

impl SaleOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        products: Arc<dyn ProductStore>,
        stock: StockLedger,
        sales: Arc<dyn SaleStore>,
        lines: Arc<dyn SaleLineStore>,
        customers: Arc<dyn CustomerStore>,
        credit: CreditLifecycle,
        audit: Arc<dyn AuditSink>,
        tax_rate: f64,
    ) -> Self {
        Self {
            products,
            stock,
            sales,
            lines,
            customers,
            credit,
            audit,
            tax_rate,
            max_term_months: None,
        }
    }

    /// Cap the credit term accepted by `realize_sale`. No cap by default.
    pub fn with_term_cap(mut self, max_term_months: Option<u32>) -> Self {
        self.max_term_months = max_term_months;
        self
    }

    /// Register a sale. Validation and the stock dry-run happen before any
    /// write; a rejected request leaves no trace anywhere.
    pub fn realize_sale(&self, request: SaleRequest, actor: &Actor) -> Result<Sale, SaleError> {
        if request.lines.is_empty() {
            return Err(SaleError::Validation("sale has no lines".into()));
        }
        for line in &request.lines {
            if line.quantity <= 0 {
                return Err(SaleError::Validation(format!(
                    "line quantity must be positive, got {}",
                    line.quantity
                )));
            }
        }
        let customer = self
            .customers
            .get_by_id(request.customer_id)?
            .ok_or_else(|| {
                SaleError::Validation(format!("unknown customer {}", request.customer_id))
            })?;

        // dry-run pass: resolve every product and check availability before
        // a single unit moves; repeated products accumulate their quantities
        let mut resolved: Vec<(Product, i64, LineTotals)> = Vec::with_capacity(request.lines.len());
        let mut requested: HashMap<Uuid, i64> = HashMap::new();
        for line in &request.lines {
            let product = match self.products.get_by_id(line.product_id)? {
                Some(p) if p.is_active => p,
                Some(p) => {
                    return Err(SaleError::Validation(format!(
                        "product {} is inactive",
                        p.code
                    )))
                }
                None => {
                    return Err(SaleError::InsufficientStock {
                        product: line.product_id.to_string(),
                        requested: line.quantity,
                        available: 0,
                    })
                }
            };
            let available = match self.stock.available(product.id) {
                Ok(available) => available,
                Err(StockError::NotTracked(_)) => 0,
                Err(err) => return Err(err.into()),
            };
            let requested_so_far = requested.entry(product.id).or_insert(0);
            *requested_so_far += line.quantity;
            if available < *requested_so_far {
                return Err(SaleError::InsufficientStock {
                    product: product.code,
                    requested: *requested_so_far,
                    available,
                });
            }
            let totals = pricing::line_totals(product.sell_price, line.quantity, self.tax_rate);
            resolved.push((product, line.quantity, totals));
        }

        // header totals are sums of the rounded line figures
        let mut subtotal = 0.0;
        let mut tax = 0.0;
        let mut total = 0.0;
        for (_, _, totals) in &resolved {
            subtotal = pricing::round2(subtotal + totals.subtotal);
            tax = pricing::round2(tax + totals.tax);
            total = pricing::round2(total + totals.total);
        }

        let (mode, down_payment, term_months, annual_rate) = match request.payment {
            PaymentTerms::Cash => (SaleMode::Cash, 0.0, 0, 0.0),
            PaymentTerms::Credit {
                down_payment,
                term_months,
                annual_rate,
            } => {
                if down_payment < 0.0 || down_payment > total {
                    return Err(SaleError::Validation(format!(
                        "down payment {down_payment:.2} must be between 0 and the sale total {total:.2}"
                    )));
                }
                if term_months == 0 {
                    return Err(SaleError::Validation(
                        "credit term must be at least one month".into(),
                    ));
                }
                if let Some(cap) = self.max_term_months {
                    if term_months > cap {
                        return Err(SaleError::Validation(format!(
                            "credit term {term_months} exceeds the maximum of {cap} months"
                        )));
                    }
                }
                if annual_rate < 0.0 {
                    return Err(SaleError::Validation(format!(
                        "annual rate must not be negative, got {annual_rate}"
                    )));
                }
                (SaleMode::Credit, down_payment, term_months, annual_rate)
            }
        };

        let mut sale = Sale::new(customer.id, request.seller_id, mode);
        sale.subtotal = subtotal;
        sale.tax = tax;
        sale.total = total;
        sale.down_payment = down_payment;
        sale.term_months = term_months;
        let sale_id = self.sales.add(&sale)?;
        sale.id = sale_id;

        // from here on, failures leave earlier writes in place
        for (product, quantity, totals) in &resolved {
            let line = SaleLine::new(sale.id, product.id, *quantity, product.sell_price, *totals);
            self.lines.add(&line)?;
            self.stock.register_exit(product.id, *quantity)?;
        }

        if sale.mode == SaleMode::Credit {
            let financed = pricing::round2(total - down_payment);
            self.credit.open_credit(
                NewCredit {
                    sale_id: sale.id,
                    customer_id: customer.id,
                    financed,
                    down_payment,
                    annual_rate,
                    term_months,
                    anchor_date: sale.date.date_naive(),
                },
                actor,
            )?;
        }

        tracing::info!(
            sale_id = %sale.id,
            code = %sale.code,
            total = sale.total,
            mode = ?sale.mode,
            "sale registered"
        );
        append_best_effort(
            self.audit.as_ref(),
            AuditEvent::new(
                actor.id,
                "sale.registered",
                sale.id,
                format!(
                    "{} line(s) totalling {:.2} for customer {}",
                    resolved.len(),
                    sale.total,
                    customer.name
                ),
            ),
        );

        Ok(sale)
    }

    /// Cancel a REGISTERED sale: restore every line's stock, terminate the
    /// credit if one exists, and mark the sale CANCELED. PAID and CANCELED
    /// sales are final and cannot be cancelled.
    pub fn cancel_sale(&self, sale_id: Uuid, actor: &Actor) -> Result<Sale, SaleError> {
        let mut sale = self
            .sales
            .get_by_id(sale_id)?
            .ok_or(SaleError::NotFound(sale_id))?;
        if sale.status != SaleStatus::Registered {
            return Err(SaleError::IllegalState {
                sale_id,
                status: sale.status,
            });
        }

        for line in self.lines.get_by_sale(sale_id)? {
            self.stock.register_entry(line.product_id, line.quantity)?;
        }

        if sale.mode == SaleMode::Credit {
            match self.credit.cancel_credit(sale_id, actor) {
                Ok(_) | Err(CreditError::NoCreditForSale(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }

        sale.status = SaleStatus::Canceled;
        self.sales.update(&sale)?;

        tracing::info!(sale_id = %sale.id, code = %sale.code, "sale canceled");
        append_best_effort(
            self.audit.as_ref(),
            AuditEvent::new(
                actor.id,
                "sale.canceled",
                sale.id,
                format!("sale {} canceled, stock restored", sale.code),
            ),
        );

        Ok(sale)
    }
}

/// Marks a sale PAID when its credit settles. Bridges the credit crate's
/// completion seam onto the sale store.
pub struct SaleCompletionAdapter {
    sales: Arc<dyn SaleStore>,
}

impl SaleCompletionAdapter {
    pub fn new(sales: Arc<dyn SaleStore>) -> Self {
        Self { sales }
    }
}

impl SaleCompletion for SaleCompletionAdapter {
    fn mark_sale_paid(&self, sale_id: Uuid) -> Result<(), StoreError> {
        if let Some(mut sale) = self.sales.get_by_id(sale_id)? {
            if sale.status == SaleStatus::Registered {
                sale.status = SaleStatus::Paid;
                self.sales.update(&sale)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    #[error("sale not found: {0}")]
    NotFound(Uuid),

    #[error("sale {sale_id} is {status:?}; only REGISTERED sales can change state")]
    IllegalState { sale_id: Uuid, status: SaleStatus },

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Credit(#[from] CreditError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
