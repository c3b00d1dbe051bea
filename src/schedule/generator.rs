use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// one period of an amortization table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period index
    pub period: u32,
    pub due_date: Option<DateTime<Utc>>,
    /// total due this period, insurance included
    pub payment: Money,
    pub interest: Money,
    pub capital: Money,
    pub insurance: Money,
    /// balance after the capital portion
    pub balance: Money,
}

/// full amortization table plus the derived flat payment
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSchedule {
    pub rows: Vec<ScheduleRow>,
    /// flat monthly payment excluding insurance
    pub flat_payment: Money,
    /// flat monthly payment including insurance
    pub monthly_payment: Money,
    pub total_interest: Money,
}

/// flat monthly payment under French (constant-payment) amortization:
/// `C = P * r * (1+r)^n / ((1+r)^n - 1)`, falling back to straight-line
/// `P / n` when the periodic rate is not positive
pub fn flat_payment(principal: Money, monthly_rate: Rate, term_months: u32) -> Money {
    if term_months == 0 {
        return principal;
    }

    let r = monthly_rate.as_decimal();
    if r <= Decimal::ZERO {
        return principal / Decimal::from(term_months);
    }

    let compound = (Decimal::ONE + r).powd(Decimal::from(term_months));
    let numerator = principal.as_decimal() * r * compound;
    let denominator = compound - Decimal::ONE;

    Money::from_decimal(numerator / denominator)
}

/// build a full French-amortization table
///
/// Every row satisfies `interest + capital == payment - insurance` and
/// `balance == previous - capital`, floored at zero. The final row is
/// corrected so the balance is exactly zero and the capital portions sum to
/// the principal, absorbing any rounding drift accumulated over the term.
pub fn generate(
    principal: Money,
    monthly_rate: Rate,
    term_months: u32,
    insurance: Money,
    start_date: Option<DateTime<Utc>>,
) -> Result<GeneratedSchedule> {
    if !principal.is_positive() {
        return Err(LedgerError::InvalidPrincipal { amount: principal });
    }
    if term_months == 0 {
        return Err(LedgerError::InvalidTerm { months: term_months });
    }
    if insurance.is_negative() {
        return Err(LedgerError::InvalidInsurance { amount: insurance });
    }

    let flat = flat_payment(principal, monthly_rate, term_months);
    let r = monthly_rate.as_decimal().max(Decimal::ZERO);

    let mut rows = Vec::with_capacity(term_months as usize);
    let mut balance = principal;
    let mut total_interest = Money::ZERO;

    for period in 1..=term_months {
        let interest = Money::from_decimal(balance.as_decimal() * r);
        let capital = if period == term_months {
            // last row absorbs the rounding drift so capital sums to principal
            balance
        } else {
            flat - interest
        };
        let ending = (balance - capital).max(Money::ZERO);

        total_interest += interest;

        rows.push(ScheduleRow {
            period,
            due_date: start_date.map(|d| add_months(d, period)),
            payment: flat + insurance,
            interest,
            capital,
            insurance,
            balance: ending,
        });

        balance = ending;
    }

    Ok(GeneratedSchedule {
        rows,
        flat_payment: flat,
        monthly_payment: flat + insurance,
        total_interest,
    })
}

/// add months to date by calendar stepping
pub(crate) fn add_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let mut result = date;
    for _ in 0..months {
        let days_in_month = days_in_month(result.year(), result.month());
        result = result + Duration::days(days_in_month as i64);
    }
    result
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
