use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan or mortgage
pub type LoanId = Uuid;

/// unique identifier for a fixed-term deposit
pub type DepositId = Uuid;

/// account currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// peruvian soles
    Pen,
    /// us dollars
    Usd,
}

/// kind of loan aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanKind {
    /// installment loan with a generated schedule
    Installment,
    /// mortgage, schedule either generated or imported from a spreadsheet
    Mortgage,
}

/// how an extraordinary principal payment reshapes the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarlyPaymentMode {
    /// hold the remaining term fixed, lower the monthly payment
    ReducePayment,
    /// hold the monthly payment fixed, shorten the term
    ReduceTerm,
}

/// when a fixed-term deposit pays its interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutMode {
    /// interest credited every 30 days
    Monthly,
    /// interest compounded and paid at maturity
    AtMaturity,
}

/// payment actually applied to a loan; append-only, created by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based schedule period this payment settles
    pub period: u32,
    pub amount: Money,
    pub interest: Money,
    pub capital: Money,
    pub insurance: Money,
    /// outstanding balance after the capital portion was applied
    pub balance_after: Money,
    pub paid_at: DateTime<Utc>,
}

/// extraordinary principal payment; append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyPaymentRecord {
    pub amount: Money,
    pub mode: EarlyPaymentMode,
    pub interest_saved: Money,
    pub applied_at: DateTime<Utc>,
}

/// kind of interest credit on a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestKind {
    Monthly,
    AtMaturity,
}

/// interest credited to a fixed-term deposit; append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRecord {
    /// 1-based 30-day period since opening
    pub period: u32,
    pub amount: Money,
    pub kind: InterestKind,
    pub credited_at: DateTime<Utc>,
}
