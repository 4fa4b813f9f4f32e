//! Mortgage amortization.
//!
//! Rates are annual percentages (`3.5` means 3.5%). Payments are monthly.

use serde::{Deserialize, Serialize};

use crate::form::percent;

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    percent(annual_rate_percent) / 12.0
}

/// Longest loan term the calculator accepts. Longer terms are treated as
/// this one.
pub const MAX_TERM_YEARS: u32 = 100;

fn months(term_years: u32) -> u32 {
    term_years.min(MAX_TERM_YEARS) * 12
}

/// Level monthly payment for an annuity loan.
///
/// `PMT = P·r(1+r)^n / ((1+r)^n − 1)`, or `P / n` at a zero rate.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    let n = months(term_years);
    if principal <= 0.0 || n == 0 {
        return 0.0;
    }
    let r = monthly_rate(annual_rate_percent);
    if r == 0.0 {
        return principal / f64::from(n);
    }
    let growth = (1.0 + r).powi(n as i32);
    principal * r * growth / (growth - 1.0)
}

/// Balance left after `elapsed_years`, amortized month by month.
///
/// Elapsed time is clamped to the term, so the result at or past the term
/// is zero (up to float rounding, which is flushed to zero).
pub fn remaining_balance(
    principal: f64,
    annual_rate_percent: f64,
    term_years: u32,
    elapsed_years: u32,
) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let term_years = term_years.min(MAX_TERM_YEARS);
    let elapsed = elapsed_years.min(term_years);
    let payment = monthly_payment(principal, annual_rate_percent, term_years);
    let r = monthly_rate(annual_rate_percent);

    let mut balance = principal;
    for _ in 0..months(elapsed) {
        balance += balance * r;
        balance -= payment;
    }
    if balance < principal * 1e-9 {
        0.0
    } else {
        balance
    }
}

/// One year of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub closing_balance: f64,
}

/// Yearly amortization schedule over the whole term.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_percent: f64,
    term_years: u32,
) -> Vec<AmortizationYear> {
    if principal <= 0.0 {
        return Vec::new();
    }
    let term_years = term_years.min(MAX_TERM_YEARS);
    let payment = monthly_payment(principal, annual_rate_percent, term_years);
    let r = monthly_rate(annual_rate_percent);

    let mut balance = principal;
    let mut rows = Vec::with_capacity(term_years as usize);
    for year in 1..=term_years {
        let mut interest_paid = 0.0;
        let mut principal_paid = 0.0;
        for _ in 0..12 {
            let interest = balance * r;
            // last payment absorbs float drift
            let reduction = (payment - interest).min(balance);
            interest_paid += interest;
            principal_paid += reduction;
            balance -= reduction;
        }
        if year == term_years {
            principal_paid += balance;
            balance = 0.0;
        }
        rows.push(AmortizationYear {
            year,
            interest_paid,
            principal_paid,
            closing_balance: balance,
        });
    }
    rows
}

/// Largest principal whose level payment fits in `payment`.
pub fn principal_for_payment(payment: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    let n = months(term_years);
    if payment <= 0.0 || n == 0 {
        return 0.0;
    }
    let r = monthly_rate(annual_rate_percent);
    if r == 0.0 {
        return payment * f64::from(n);
    }
    payment * (1.0 - (1.0 + r).powi(-(n as i32))) / r
}
