use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{DepositId, EarlyPaymentMode, LoanId};

/// all events that can be emitted by ledger operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // loan lifecycle
    LoanOriginated {
        loan_id: LoanId,
        principal: Money,
        term_months: u32,
        monthly_payment: Money,
        timestamp: DateTime<Utc>,
    },
    ScheduleImported {
        loan_id: LoanId,
        periods: u32,
        derived_principal: Money,
        derived_payment: Money,
        timestamp: DateTime<Utc>,
    },
    LoanSettled {
        loan_id: LoanId,
        total_paid: Money,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentRecorded {
        loan_id: LoanId,
        period: u32,
        amount: Money,
        interest: Money,
        capital: Money,
        balance_after: Money,
        timestamp: DateTime<Utc>,
    },
    EarlyPaymentApplied {
        loan_id: LoanId,
        amount: Money,
        mode: EarlyPaymentMode,
        interest_saved: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentRecalculated {
        loan_id: LoanId,
        old_payment: Money,
        new_payment: Money,
        timestamp: DateTime<Utc>,
    },
    TermRecalculated {
        loan_id: LoanId,
        old_term: u32,
        new_term: u32,
        timestamp: DateTime<Utc>,
    },
    RatePromoted {
        loan_id: LoanId,
        rate: Rate,
        timestamp: DateTime<Utc>,
    },

    // deposit events
    DepositOpened {
        deposit_id: DepositId,
        principal: Money,
        term_days: u32,
        timestamp: DateTime<Utc>,
    },
    InterestAccrued {
        deposit_id: DepositId,
        period: u32,
        amount: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    DepositMatured {
        deposit_id: DepositId,
        final_balance: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
