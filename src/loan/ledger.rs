use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::loan::account::Loan;
use crate::types::PaymentRecord;

/// apply the next scheduled (or recurring) payment to a loan
///
/// Payments are strictly sequential: the schedule position is the count of
/// existing payment records. Exactly one record is appended on success; on
/// failure the loan is left untouched.
pub fn record_next_payment(
    loan: &mut Loan,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<PaymentRecord> {
    if loan.is_settled() {
        return Err(LedgerError::AlreadySettled);
    }

    let index = loan.payments.len();

    let (amount, interest, capital, insurance) = if !loan.schedule.is_empty() {
        // scheduled path: pull the next unpaid row
        let row = loan
            .schedule
            .get(index)
            .ok_or(LedgerError::ScheduleExhausted {
                periods: loan.schedule.len() as u32,
            })?;

        let capital = row.capital.min(loan.outstanding_balance);
        (row.payment, row.interest, capital, row.insurance)
    } else {
        // recurring path: recompute this single period from the balance
        if loan.remaining_term == 0 {
            return Err(LedgerError::ScheduleExhausted {
                periods: loan.term_months,
            });
        }
        let monthly_rate = loan.monthly_rate().ok_or(LedgerError::MissingRate)?;
        let r = monthly_rate.as_decimal().max(Decimal::ZERO);

        let interest = Money::from_decimal(loan.outstanding_balance.as_decimal() * r);
        let capital = (loan.monthly_payment - loan.monthly_insurance - interest)
            .max(Money::ZERO)
            .min(loan.outstanding_balance);
        (loan.monthly_payment, interest, capital, loan.monthly_insurance)
    };

    let balance_after = (loan.outstanding_balance - capital).max(Money::ZERO);
    let paid_at = time_provider.now();

    let record = PaymentRecord {
        period: index as u32 + 1,
        amount,
        interest,
        capital,
        insurance,
        balance_after,
        paid_at,
    };

    loan.outstanding_balance = balance_after;
    loan.total_payable = (loan.total_payable - amount).max(Money::ZERO);
    loan.remaining_term = loan.remaining_term.saturating_sub(1);
    loan.payments.push(record.clone());

    events.emit(Event::PaymentRecorded {
        loan_id: loan.id,
        period: record.period,
        amount,
        interest,
        capital,
        balance_after,
        timestamp: paid_at,
    });

    if loan.is_settled() {
        events.emit(Event::LoanSettled {
            loan_id: loan.id,
            total_paid: loan.total_paid(),
            timestamp: paid_at,
        });
    }

    Ok(record)
}
