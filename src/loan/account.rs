use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::rates::monthly_effective;
use crate::schedule::generator::{self, ScheduleRow};
use crate::schedule::import::ImportedSchedule;
use crate::types::{Currency, EarlyPaymentRecord, LoanId, LoanKind, PaymentRecord};

/// loan / mortgage aggregate
///
/// The outstanding balance only ever decreases; payment and early-payment
/// records are append-only. The next schedule position is always derived from
/// `payments.len()`; deleting a payment record out of band is unsupported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub kind: LoanKind,
    pub currency: Currency,

    pub principal: Money,
    /// annual effective rate; None for mortgages imported from a spreadsheet
    /// until a reference rate is promoted
    pub annual_rate: Option<Rate>,
    pub term_months: u32,
    pub monthly_insurance: Money,
    pub opened_at: DateTime<Utc>,

    pub outstanding_balance: Money,
    /// flat monthly payment, insurance included
    pub monthly_payment: Money,
    pub schedule: Vec<ScheduleRow>,

    pub payments: Vec<PaymentRecord>,
    pub early_payments: Vec<EarlyPaymentRecord>,

    pub remaining_term: u32,
    /// remaining sum of future payments
    pub total_payable: Money,
    /// cumulative interest saved by early payments
    pub interest_saved: Money,
}

impl Loan {
    /// originate a loan with a generated French-amortization schedule
    pub fn originate(
        kind: LoanKind,
        currency: Currency,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        monthly_insurance: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Self> {
        let opened_at = time_provider.now();
        let monthly_rate = monthly_effective(annual_rate);
        let generated = generator::generate(
            principal,
            monthly_rate,
            term_months,
            monthly_insurance,
            Some(opened_at),
        )?;

        let loan = Self {
            id: Uuid::new_v4(),
            kind,
            currency,
            principal,
            annual_rate: Some(annual_rate),
            term_months,
            monthly_insurance,
            opened_at,
            outstanding_balance: principal,
            monthly_payment: generated.monthly_payment,
            schedule: generated.rows,
            payments: Vec::new(),
            early_payments: Vec::new(),
            remaining_term: term_months,
            total_payable: generated.monthly_payment * rust_decimal::Decimal::from(term_months),
            interest_saved: Money::ZERO,
        };

        events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            principal,
            term_months,
            monthly_payment: loan.monthly_payment,
            timestamp: opened_at,
        });

        Ok(loan)
    }

    /// create a mortgage from an imported spreadsheet schedule; the annual
    /// rate stays unknown until promoted by an early payment
    pub fn from_imported_schedule(
        currency: Currency,
        imported: ImportedSchedule,
        monthly_insurance: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Self {
        let opened_at = time_provider.now();
        let term_months = imported.rows.len() as u32;

        let loan = Self {
            id: Uuid::new_v4(),
            kind: LoanKind::Mortgage,
            currency,
            principal: imported.derived_principal,
            annual_rate: None,
            term_months,
            monthly_insurance,
            opened_at,
            outstanding_balance: imported.derived_principal,
            monthly_payment: imported.derived_payment,
            schedule: imported.rows,
            payments: Vec::new(),
            early_payments: Vec::new(),
            remaining_term: term_months,
            total_payable: imported.total_payable,
            interest_saved: Money::ZERO,
        };

        events.emit(Event::ScheduleImported {
            loan_id: loan.id,
            periods: term_months,
            derived_principal: loan.principal,
            derived_payment: loan.monthly_payment,
            timestamp: opened_at,
        });

        loan
    }

    /// create a recurring mortgage without a stored table; each payment is
    /// recomputed from the current balance and the annual rate
    pub fn recurring(
        currency: Currency,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        monthly_insurance: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Self> {
        let opened_at = time_provider.now();
        let monthly_rate = monthly_effective(annual_rate);
        // validate inputs and derive the flat payment, but store no table
        let generated =
            generator::generate(principal, monthly_rate, term_months, monthly_insurance, None)?;

        let loan = Self {
            id: Uuid::new_v4(),
            kind: LoanKind::Mortgage,
            currency,
            principal,
            annual_rate: Some(annual_rate),
            term_months,
            monthly_insurance,
            opened_at,
            outstanding_balance: principal,
            monthly_payment: generated.monthly_payment,
            schedule: Vec::new(),
            payments: Vec::new(),
            early_payments: Vec::new(),
            remaining_term: term_months,
            total_payable: generated.monthly_payment * rust_decimal::Decimal::from(term_months),
            interest_saved: Money::ZERO,
        };

        events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            principal,
            term_months,
            monthly_payment: loan.monthly_payment,
            timestamp: opened_at,
        });

        Ok(loan)
    }

    /// equivalent monthly effective rate, when the annual rate is known
    pub fn monthly_rate(&self) -> Option<Rate> {
        self.annual_rate.map(monthly_effective)
    }

    /// 1-based period the next payment settles
    pub fn next_period(&self) -> u32 {
        self.payments.len() as u32 + 1
    }

    pub fn is_settled(&self) -> bool {
        !self.outstanding_balance.is_positive()
    }

    pub fn total_paid(&self) -> Money {
        self.payments
            .iter()
            .map(|p| p.amount)
            .fold(Money::ZERO, |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    #[test]
    fn test_originate_builds_full_schedule() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let mut events = EventStore::new();

        let loan = Loan::originate(
            LoanKind::Installment,
            Currency::Pen,
            Money::from_major(100_000),
            Rate::from_percentage(dec!(12)),
            12,
            Money::ZERO,
            &time,
            &mut events,
        )
        .unwrap();

        assert_eq!(loan.schedule.len(), 12);
        assert_eq!(loan.remaining_term, 12);
        assert_eq!(loan.outstanding_balance, Money::from_major(100_000));
        assert_eq!(
            loan.total_payable,
            loan.monthly_payment * dec!(12)
        );
        assert!(matches!(events.events()[0], Event::LoanOriginated { .. }));
    }

    #[test]
    fn test_recurring_has_no_stored_schedule() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let mut events = EventStore::new();

        let loan = Loan::recurring(
            Currency::Usd,
            Money::from_major(200_000),
            Rate::from_percentage(dec!(8.5)),
            240,
            Money::from_major(40),
            &time,
            &mut events,
        )
        .unwrap();

        assert!(loan.schedule.is_empty());
        assert!(loan.monthly_payment > Money::from_major(40));
        assert_eq!(loan.remaining_term, 240);
    }

    #[test]
    fn test_json_round_trip() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let mut events = EventStore::new();

        let loan = Loan::originate(
            LoanKind::Mortgage,
            Currency::Usd,
            Money::from_major(120_000),
            Rate::from_percentage(dec!(8.5)),
            240,
            Money::from_major(45),
            &time,
            &mut events,
        )
        .unwrap();

        let json = serde_json::to_string(&loan).unwrap();
        let restored: Loan = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, loan.id);
        assert_eq!(restored.outstanding_balance, loan.outstanding_balance);
        assert_eq!(restored.monthly_payment, loan.monthly_payment);
        assert_eq!(restored.schedule, loan.schedule);
        assert_eq!(restored.annual_rate, loan.annual_rate);
    }

    #[test]
    fn test_next_period_derived_from_payment_count() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let mut events = EventStore::new();

        let loan = Loan::originate(
            LoanKind::Installment,
            Currency::Pen,
            Money::from_major(10_000),
            Rate::from_percentage(dec!(10)),
            6,
            Money::ZERO,
            &time,
            &mut events,
        )
        .unwrap();

        assert_eq!(loan.next_period(), 1);
        assert!(!loan.is_settled());
    }
}
