use chrono::Duration;
use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::deposit::account::Deposit;
use crate::events::{Event, EventStore};
use crate::rates::MONTH_DAYS;
use crate::types::{InterestKind, InterestRecord, PayoutMode};

/// result of an accrual catch-up pass
#[derive(Debug, Clone, PartialEq)]
pub struct CatchUpOutcome {
    /// records appended by this pass
    pub applied: Vec<InterestRecord>,
    /// periods due but left for manual application (monthly payout with
    /// automatic accrual disabled)
    pub pending_periods: u32,
    pub new_balance: Money,
}

impl CatchUpOutcome {
    pub fn applied_count(&self) -> u32 {
        self.applied.len() as u32
    }
}

/// append the interest records a deposit is owed for elapsed time
///
/// Safe to invoke on every load: the number of elapsed 30-day periods is
/// always compared against the count of existing records, so a second pass
/// with no time elapsed appends nothing. At-maturity deposits always accrue;
/// monthly-payout deposits accrue only when `auto_accrual` is set, otherwise
/// the due periods are surfaced as a pending count.
pub fn catch_up(
    deposit: &mut Deposit,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> CatchUpOutcome {
    let now = time_provider.now();
    let elapsed = deposit.elapsed_periods(now);
    let recorded = deposit.interest_history.len() as u32;
    let missing = elapsed.saturating_sub(recorded);

    let mut applied = Vec::new();
    let mut pending_periods = 0;

    if missing > 0 {
        if deposit.payout == PayoutMode::Monthly && !deposit.auto_accrual {
            pending_periods = missing;
        } else {
            let kind = match deposit.payout {
                PayoutMode::Monthly => InterestKind::Monthly,
                PayoutMode::AtMaturity => InterestKind::AtMaturity,
            };

            applied.reserve(missing as usize);
            for period in (recorded + 1)..=elapsed {
                let credited_at =
                    deposit.opened_at + Duration::days((period * MONTH_DAYS) as i64);
                let record = InterestRecord {
                    period,
                    amount: deposit.period_interest,
                    kind,
                    credited_at,
                };
                deposit.interest_history.push(record.clone());

                events.emit(Event::InterestAccrued {
                    deposit_id: deposit.id,
                    period,
                    amount: record.amount,
                    new_balance: deposit.balance(),
                    timestamp: credited_at,
                });

                applied.push(record);
            }
        }
    }

    // checked on every pass: the term may end between period boundaries, so
    // maturity can arrive on an invocation that appends nothing
    if deposit.matured_at.is_none()
        && deposit.interest_history.len() as u32 == deposit.total_periods()
        && deposit.is_matured(now)
    {
        deposit.matured_at = Some(now);
        events.emit(Event::DepositMatured {
            deposit_id: deposit.id,
            final_balance: deposit.balance(),
            timestamp: now,
        });
    }

    CatchUpOutcome {
        applied,
        pending_periods,
        new_balance: deposit.balance(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::Currency;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn open_deposit(
        payout: PayoutMode,
        auto_accrual: bool,
    ) -> (Deposit, SafeTimeProvider, EventStore) {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let mut events = EventStore::new();
        let deposit = Deposit::open(
            Currency::Pen,
            Money::from_major(10_000),
            Rate::from_percentage(dec!(5)),
            180,
            payout,
            auto_accrual,
            &time,
            &mut events,
        )
        .unwrap();
        events.clear();
        (deposit, time, events)
    }

    #[test]
    fn test_no_accrual_before_first_period() {
        let (mut deposit, time, mut events) = open_deposit(PayoutMode::Monthly, true);
        let control = time.test_control().unwrap();
        control.advance(Duration::days(29));

        let outcome = catch_up(&mut deposit, &time, &mut events);

        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.pending_periods, 0);
        assert!(deposit.interest_history.is_empty());
    }

    #[test]
    fn test_catch_up_appends_missing_periods() {
        let (mut deposit, time, mut events) = open_deposit(PayoutMode::Monthly, true);
        let control = time.test_control().unwrap();
        control.advance(Duration::days(95)); // three whole periods

        let outcome = catch_up(&mut deposit, &time, &mut events);

        assert_eq!(outcome.applied_count(), 3);
        assert_eq!(deposit.interest_history.len(), 3);
        assert_eq!(
            deposit.interest_history.iter().map(|r| r.period).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            outcome.new_balance,
            deposit.principal + deposit.period_interest * rust_decimal::Decimal::from(3)
        );
        assert_eq!(events.events().len(), 3);
    }

    #[test]
    fn test_catch_up_is_idempotent() {
        let (mut deposit, time, mut events) = open_deposit(PayoutMode::Monthly, true);
        let control = time.test_control().unwrap();
        control.advance(Duration::days(65));

        let first = catch_up(&mut deposit, &time, &mut events);
        assert_eq!(first.applied_count(), 2);

        // no time has passed: second pass appends nothing
        let second = catch_up(&mut deposit, &time, &mut events);
        assert!(second.applied.is_empty());
        assert_eq!(deposit.interest_history.len(), 2);
        assert_eq!(second.new_balance, first.new_balance);
    }

    #[test]
    fn test_manual_monthly_reports_pending() {
        let (mut deposit, time, mut events) = open_deposit(PayoutMode::Monthly, false);
        let control = time.test_control().unwrap();
        control.advance(Duration::days(95));

        let outcome = catch_up(&mut deposit, &time, &mut events);

        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.pending_periods, 3);
        assert!(deposit.interest_history.is_empty());
        assert!(events.events().is_empty());
    }

    #[test]
    fn test_at_maturity_ignores_auto_flag() {
        let (mut deposit, time, mut events) = open_deposit(PayoutMode::AtMaturity, false);
        let control = time.test_control().unwrap();
        control.advance(Duration::days(95));

        let outcome = catch_up(&mut deposit, &time, &mut events);

        assert_eq!(outcome.applied_count(), 3);
        assert_eq!(outcome.applied[0].kind, InterestKind::AtMaturity);
    }

    #[test]
    fn test_accrual_stops_at_maturity() {
        let (mut deposit, time, mut events) = open_deposit(PayoutMode::AtMaturity, false);
        let control = time.test_control().unwrap();
        control.advance(Duration::days(400)); // well past the 180-day term

        let outcome = catch_up(&mut deposit, &time, &mut events);

        assert_eq!(outcome.applied_count(), 6);
        assert_eq!(deposit.interest_history.len(), 6);
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::DepositMatured { .. })));

        // nothing more accrues no matter how much later we run
        control.advance(Duration::days(400));
        let again = catch_up(&mut deposit, &time, &mut events);
        assert!(again.applied.is_empty());
        assert_eq!(deposit.interest_history.len(), 6);
    }

    #[test]
    fn test_maturity_event_between_period_boundaries() {
        // 200-day term: all six 30-day periods complete on day 180, twenty
        // days before maturity
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let mut events = EventStore::new();
        let mut deposit = Deposit::open(
            Currency::Pen,
            Money::from_major(10_000),
            Rate::from_percentage(dec!(5)),
            200,
            PayoutMode::AtMaturity,
            false,
            &time,
            &mut events,
        )
        .unwrap();
        events.clear();
        let control = time.test_control().unwrap();

        // all periods recorded, but the deposit has not matured yet
        control.advance(Duration::days(185));
        let outcome = catch_up(&mut deposit, &time, &mut events);
        assert_eq!(outcome.applied_count(), 6);
        assert!(!events
            .events()
            .iter()
            .any(|e| matches!(e, Event::DepositMatured { .. })));

        // past maturity: nothing left to accrue, the event must still fire
        control.advance(Duration::days(30));
        let outcome = catch_up(&mut deposit, &time, &mut events);
        assert!(outcome.applied.is_empty());
        let matured = events
            .events()
            .iter()
            .filter(|e| matches!(e, Event::DepositMatured { .. }))
            .count();
        assert_eq!(matured, 1);
        assert!(deposit.matured_at.is_some());

        // and only once
        control.advance(Duration::days(30));
        catch_up(&mut deposit, &time, &mut events);
        let matured = events
            .events()
            .iter()
            .filter(|e| matches!(e, Event::DepositMatured { .. }))
            .count();
        assert_eq!(matured, 1);
    }

    #[test]
    fn test_balance_invariant_holds() {
        let (mut deposit, time, mut events) = open_deposit(PayoutMode::Monthly, true);
        let control = time.test_control().unwrap();
        control.advance(Duration::days(180));

        catch_up(&mut deposit, &time, &mut events);

        let history_sum = deposit
            .interest_history
            .iter()
            .map(|r| r.amount)
            .fold(Money::ZERO, |acc, x| acc + x);
        assert_eq!(deposit.balance(), deposit.principal + history_sum);
    }
}
