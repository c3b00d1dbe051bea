use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::rates::{effective_for_days, MONTH_DAYS};

/// simulation figures for a fixed-term deposit; no state is touched
#[derive(Debug, Clone, PartialEq)]
pub struct DpfProjection {
    /// interest for one 30-day period
    pub monthly_interest: Money,
    /// aggregate over the whole term if paid out monthly
    pub total_if_monthly: Money,
    /// interest compounded for the whole term, paid at maturity
    pub at_maturity_interest: Money,
    /// whole 30-day periods in the term
    pub periods: u32,
}

/// project the interest of a fixed-term deposit
///
/// `monthly = monto * ((1+TEA)^(30/360) - 1)`; the monthly-payout aggregate
/// scales that by `term_days / 30`; the at-maturity figure compounds over
/// `term_days / 360`. A caller without a known rate gets `MissingRate`.
pub fn project(principal: Money, annual_rate: Option<Rate>, term_days: u32) -> Result<DpfProjection> {
    if !principal.is_positive() {
        return Err(LedgerError::InvalidPrincipal { amount: principal });
    }
    if term_days == 0 {
        return Err(LedgerError::InvalidTermDays { days: term_days });
    }
    let annual = annual_rate.ok_or(LedgerError::MissingRate)?;

    let monthly_rate = effective_for_days(annual, MONTH_DAYS);
    let monthly_interest = Money::from_decimal(principal.as_decimal() * monthly_rate.as_decimal());

    let months = Decimal::from(term_days) / Decimal::from(MONTH_DAYS);
    let total_if_monthly = Money::from_decimal(monthly_interest.as_decimal() * months);

    let term_rate = effective_for_days(annual, term_days);
    let at_maturity_interest = Money::from_decimal(principal.as_decimal() * term_rate.as_decimal());

    Ok(DpfProjection {
        monthly_interest,
        total_if_monthly,
        at_maturity_interest,
        periods: term_days / MONTH_DAYS,
    })
}
