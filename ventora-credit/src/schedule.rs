use chrono::{Months, NaiveDate};
use uuid::Uuid;

use crate::models::Installment;
use ventora_catalog::pricing;

/// Build the full amortization schedule for a credit: `term_months` level
/// installments, due one calendar month apart starting one month after the
/// anchor date, all unpaid. Month-end dates clamp the way chrono clamps
/// (Jan 31 + 1 month = Feb 28/29).
pub fn build_schedule(
    credit_id: Uuid,
    financed: f64,
    annual_rate_percent: f64,
    term_months: u32,
    anchor: NaiveDate,
) -> Vec<Installment> {
    let amount = pricing::installment(financed, annual_rate_percent, term_months);
    (1..=term_months)
        .map(|sequence| {
            let due_date = anchor
                .checked_add_months(Months::new(sequence))
                .unwrap_or(NaiveDate::MAX);
            Installment::new(credit_id, sequence, amount, due_date)
        })
        .collect()
}
