use std::collections::HashMap;

use crate::deposit::account::Deposit;
use crate::loan::account::Loan;
use crate::types::{DepositId, LoanId};

/// repository seam for loan aggregates: whole-record upsert, last write wins.
/// Callers read the latest record immediately before computing an update.
pub trait LoanStore {
    fn get(&self, id: &LoanId) -> Option<Loan>;
    fn upsert(&mut self, loan: Loan);
}

/// repository seam for deposit aggregates
pub trait DepositStore {
    fn get(&self, id: &DepositId) -> Option<Deposit>;
    fn upsert(&mut self, deposit: Deposit);
}

/// in-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    loans: HashMap<LoanId, Loan>,
    deposits: HashMap<DepositId, Deposit>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoanStore for MemoryStore {
    fn get(&self, id: &LoanId) -> Option<Loan> {
        self.loans.get(id).cloned()
    }

    fn upsert(&mut self, loan: Loan) {
        self.loans.insert(loan.id, loan);
    }
}

impl DepositStore for MemoryStore {
    fn get(&self, id: &DepositId) -> Option<Deposit> {
        self.deposits.get(id).cloned()
    }

    fn upsert(&mut self, deposit: Deposit) {
        self.deposits.insert(deposit.id, deposit);
    }
}
