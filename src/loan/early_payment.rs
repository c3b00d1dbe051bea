use hourglass_rs::SafeTimeProvider;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::loan::account::Loan;
use crate::rates::monthly_effective;
use crate::schedule::generator::flat_payment;
use crate::types::{EarlyPaymentMode, EarlyPaymentRecord};

/// result of applying an extraordinary principal payment
#[derive(Debug, Clone, PartialEq)]
pub struct EarlyPaymentOutcome {
    pub record: EarlyPaymentRecord,
    pub old_payment: Money,
    pub new_payment: Money,
    pub old_term: u32,
    pub new_term: u32,
    pub new_balance: Money,
    pub interest_saved: Money,
    /// the loan's rate was unknown and the supplied reference rate was
    /// promoted to the permanent rate
    pub rate_promoted: bool,
}

/// apply an extraordinary principal payment ("abono") to a loan
///
/// `ReducePayment` holds the remaining term fixed and recomputes the flat
/// payment; `ReduceTerm` holds the payment fixed and solves for the new term.
/// An amount exceeding the outstanding balance is not an error: the new
/// balance clamps to zero. All failures leave the loan untouched.
pub fn apply_early_payment(
    loan: &mut Loan,
    amount: Money,
    mode: EarlyPaymentMode,
    reference_rate: Option<Rate>,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<EarlyPaymentOutcome> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount { amount });
    }
    if loan.is_settled() {
        return Err(LedgerError::AlreadySettled);
    }
    if loan.remaining_term == 0 {
        return Err(LedgerError::ScheduleExhausted {
            periods: loan.term_months,
        });
    }

    let known_rate = loan.annual_rate.or(reference_rate);
    let promoting = loan.annual_rate.is_none() && reference_rate.is_some();

    let new_balance = (loan.outstanding_balance - amount).max(Money::ZERO);
    let base_budget = loan.monthly_payment - loan.monthly_insurance;
    let old_payment = loan.monthly_payment;
    let old_term = loan.remaining_term;

    let (new_payment, new_term) = match mode {
        EarlyPaymentMode::ReducePayment => {
            // unknown rate degenerates to the straight-line recomputation
            let monthly_rate = known_rate.map(monthly_effective).unwrap_or(Rate::ZERO);
            let new_flat = if new_balance.is_zero() {
                Money::ZERO
            } else {
                flat_payment(new_balance, monthly_rate, old_term)
            };
            (new_flat + loan.monthly_insurance, old_term)
        }
        EarlyPaymentMode::ReduceTerm => {
            let annual = known_rate.ok_or(LedgerError::MissingRate)?;
            let monthly_rate = monthly_effective(annual);
            let term = solve_term(new_balance, base_budget, monthly_rate)?;
            (loan.monthly_payment, term)
        }
    };

    // interest-savings accounting against the untouched remaining stream
    let total_original = old_payment * Decimal::from(old_term);
    let total_new = new_payment * Decimal::from(new_term);
    let saved = (total_original - total_new).max(Money::ZERO);

    let applied_at = time_provider.now();
    let record = EarlyPaymentRecord {
        amount,
        mode,
        interest_saved: saved,
        applied_at,
    };

    loan.outstanding_balance = new_balance;
    loan.monthly_payment = new_payment;
    loan.remaining_term = new_term;
    loan.interest_saved += saved;
    loan.total_payable = (loan.total_payable - saved - amount).max(Money::ZERO);
    loan.early_payments.push(record.clone());

    if promoting {
        // one-time transition: the reference rate becomes the loan's rate
        let rate = reference_rate.unwrap_or(Rate::ZERO);
        loan.annual_rate = Some(rate);
        events.emit(Event::RatePromoted {
            loan_id: loan.id,
            rate,
            timestamp: applied_at,
        });
    }

    events.emit(Event::EarlyPaymentApplied {
        loan_id: loan.id,
        amount,
        mode,
        interest_saved: saved,
        new_balance,
        timestamp: applied_at,
    });
    match mode {
        EarlyPaymentMode::ReducePayment => events.emit(Event::PaymentRecalculated {
            loan_id: loan.id,
            old_payment,
            new_payment,
            timestamp: applied_at,
        }),
        EarlyPaymentMode::ReduceTerm => events.emit(Event::TermRecalculated {
            loan_id: loan.id,
            old_term,
            new_term,
            timestamp: applied_at,
        }),
    }

    Ok(EarlyPaymentOutcome {
        record,
        old_payment,
        new_payment,
        old_term,
        new_term,
        new_balance,
        interest_saved: saved,
        rate_promoted: promoting,
    })
}

/// periods needed to amortize `balance` with a fixed `payment` at the given
/// monthly rate: `n = ceil( ln(C / (C - B*r)) / ln(1+r) )`
fn solve_term(balance: Money, payment: Money, monthly_rate: Rate) -> Result<u32> {
    if balance.is_zero() {
        return Ok(0);
    }

    let r = monthly_rate.as_decimal();
    if r <= Decimal::ZERO {
        // no interest: plain division, rounded up
        if !payment.is_positive() {
            return Err(LedgerError::Unamortizable {
                payment,
                interest_due: Money::ZERO,
            });
        }
        let periods = (balance.as_decimal() / payment.as_decimal()).ceil();
        return Ok(periods.to_u32().unwrap_or(0));
    }

    let period_interest = Money::from_decimal(balance.as_decimal() * r);
    if payment <= period_interest {
        // the fixed payment can never cover the interest, let alone amortize
        return Err(LedgerError::Unamortizable {
            payment,
            interest_due: period_interest,
        });
    }

    let c = payment.as_decimal();
    let b = balance.as_decimal();
    let numerator = (c / (c - b * r)).ln();
    let denominator = (Decimal::ONE + r).ln();
    let periods = (numerator / denominator).ceil();

    Ok(periods.to_u32().unwrap_or(u32::MAX))
}
