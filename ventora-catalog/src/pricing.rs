use serde::{Deserialize, Serialize};

/// Round to 2 decimal places, half away from zero. Every monetary figure
/// the engine emits goes through this exactly once; values already rounded
/// are summed, never re-rounded.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of raw prices. Empty input is 0.
pub fn subtotal(prices: &[f64]) -> f64 {
    prices.iter().sum()
}

/// Tax on a subtotal at the given rate (e.g. 0.19 for 19%).
pub fn tax(subtotal: f64, rate: f64) -> f64 {
    round2(subtotal * rate)
}

/// Subtotal plus tax, rounded once.
pub fn total(subtotal: f64, rate: f64) -> f64 {
    round2(subtotal + tax(subtotal, rate))
}

/// Per-line monetary figures, each rounded independently so that line sums
/// match the sale header to the cent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

pub fn line_totals(unit_price: f64, quantity: i64, rate: f64) -> LineTotals {
    let line_subtotal = round2(unit_price * quantity as f64);
    let line_tax = tax(line_subtotal, rate);
    LineTotals {
        subtotal: line_subtotal,
        tax: line_tax,
        total: round2(line_subtotal + line_tax),
    }
}

/// Level monthly payment for a financed amount.
///
/// Zero annual rate degenerates to straight division; otherwise the
/// standard annuity formula with monthly compounding:
/// `C = P * (i(1+i)^n) / ((1+i)^n - 1)`.
pub fn installment(financed: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return 0.0;
    }
    let monthly_rate = (annual_rate_percent / 100.0) / 12.0;
    if monthly_rate == 0.0 {
        return round2(financed / term_months as f64);
    }
    let growth = (1.0 + monthly_rate).powi(term_months as i32);
    round2(financed * (monthly_rate * growth) / (growth - 1.0))
}

/// Total interest paid over the life of the credit. Never negative.
pub fn total_interest(financed: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    let paid = installment(financed, annual_rate_percent, term_months) * term_months as f64;
    round2(paid - financed).max(0.0)
}
