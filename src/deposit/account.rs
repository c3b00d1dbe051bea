use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::deposit::projection;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::rates::MONTH_DAYS;
use crate::types::{Currency, DepositId, InterestRecord, PayoutMode};

/// fixed-term deposit (DPF) aggregate
///
/// The balance is always `principal + sum(interest_history)`; interest
/// records are append-only and the accrual position is derived from their
/// count, never from a separate counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,
    pub currency: Currency,

    pub principal: Money,
    pub annual_rate: Rate,
    pub term_days: u32,
    pub opened_at: DateTime<Utc>,
    pub payout: PayoutMode,

    /// fixed interest credited per 30-day period
    pub period_interest: Money,
    /// apply pending periods automatically on catch-up (monthly payout only;
    /// at-maturity deposits always accrue)
    pub auto_accrual: bool,

    pub interest_history: Vec<InterestRecord>,
    /// set once the maturity event has been emitted
    pub matured_at: Option<DateTime<Utc>>,
}

impl Deposit {
    /// open a deposit; the per-period interest is fixed at opening
    pub fn open(
        currency: Currency,
        principal: Money,
        annual_rate: Rate,
        term_days: u32,
        payout: PayoutMode,
        auto_accrual: bool,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Self> {
        let figures = projection::project(principal, Some(annual_rate), term_days)?;
        let opened_at = time_provider.now();

        let deposit = Self {
            id: Uuid::new_v4(),
            currency,
            principal,
            annual_rate,
            term_days,
            opened_at,
            payout,
            period_interest: figures.monthly_interest,
            auto_accrual,
            interest_history: Vec::new(),
            matured_at: None,
        };

        events.emit(Event::DepositOpened {
            deposit_id: deposit.id,
            principal,
            term_days,
            timestamp: opened_at,
        });

        Ok(deposit)
    }

    /// cumulative interest credited so far
    pub fn accrued_interest(&self) -> Money {
        self.interest_history
            .iter()
            .map(|r| r.amount)
            .fold(Money::ZERO, |acc, x| acc + x)
    }

    /// current balance: principal plus credited interest
    pub fn balance(&self) -> Money {
        self.principal + self.accrued_interest()
    }

    /// whole 30-day periods in the full term
    pub fn total_periods(&self) -> u32 {
        self.term_days / MONTH_DAYS
    }

    /// whole 30-day periods elapsed since opening, capped at the term
    pub fn elapsed_periods(&self, now: DateTime<Utc>) -> u32 {
        let days = (now - self.opened_at).num_days().max(0) as u32;
        (days / MONTH_DAYS).min(self.total_periods())
    }

    pub fn is_matured(&self, now: DateTime<Utc>) -> bool {
        (now - self.opened_at).num_days() >= self.term_days as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn open_deposit(payout: PayoutMode) -> (Deposit, SafeTimeProvider, EventStore) {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let mut events = EventStore::new();
        let deposit = Deposit::open(
            Currency::Pen,
            Money::from_major(10_000),
            Rate::from_percentage(dec!(5)),
            180,
            payout,
            true,
            &time,
            &mut events,
        )
        .unwrap();
        (deposit, time, events)
    }

    #[test]
    fn test_open_fixes_period_interest() {
        let (deposit, _, events) = open_deposit(PayoutMode::Monthly);

        assert!(deposit.period_interest > Money::from_str_exact("40.7").unwrap());
        assert!(deposit.period_interest < Money::from_str_exact("40.8").unwrap());
        assert_eq!(deposit.total_periods(), 6);
        assert!(matches!(events.events()[0], Event::DepositOpened { .. }));
    }

    #[test]
    fn test_balance_is_principal_plus_history() {
        let (mut deposit, _, _) = open_deposit(PayoutMode::Monthly);
        assert_eq!(deposit.balance(), Money::from_major(10_000));

        deposit.interest_history.push(InterestRecord {
            period: 1,
            amount: Money::from_major(40),
            kind: crate::types::InterestKind::Monthly,
            credited_at: deposit.opened_at,
        });
        assert_eq!(deposit.balance(), Money::from_major(10_040));
    }

    #[test]
    fn test_json_round_trip() {
        let (deposit, _, _) = open_deposit(PayoutMode::AtMaturity);

        let json = serde_json::to_string(&deposit).unwrap();
        let restored: Deposit = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, deposit.id);
        assert_eq!(restored.period_interest, deposit.period_interest);
        assert_eq!(restored.payout, deposit.payout);
        assert_eq!(restored.balance(), deposit.balance());
    }

    #[test]
    fn test_elapsed_periods_capped_at_term() {
        let (deposit, _, _) = open_deposit(PayoutMode::AtMaturity);

        let just_opened = deposit.opened_at + Duration::days(29);
        assert_eq!(deposit.elapsed_periods(just_opened), 0);

        let mid_term = deposit.opened_at + Duration::days(95);
        assert_eq!(deposit.elapsed_periods(mid_term), 3);

        let far_past_maturity = deposit.opened_at + Duration::days(900);
        assert_eq!(deposit.elapsed_periods(far_past_maturity), 6);
        assert!(deposit.is_matured(far_past_maturity));
    }
}
