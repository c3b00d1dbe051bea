use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid principal: {amount}")]
    InvalidPrincipal {
        amount: Money,
    },

    #[error("invalid term: {months} months")]
    InvalidTerm {
        months: u32,
    },

    #[error("invalid term: {days} days")]
    InvalidTermDays {
        days: u32,
    },

    #[error("invalid insurance amount: {amount}")]
    InvalidInsurance {
        amount: Money,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("annual rate required but not known for this operation")]
    MissingRate,

    #[error("schedule exhausted: all {periods} periods already paid")]
    ScheduleExhausted {
        periods: u32,
    },

    #[error("already paid off: outstanding balance is zero")]
    AlreadySettled,

    #[error("payment insufficient to amortize: payment {payment}, period interest {interest_due}")]
    Unamortizable {
        payment: Money,
        interest_due: Money,
    },

    #[error("invalid schedule import: {message}")]
    InvalidImport {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
