pub mod account;
pub mod early_payment;
pub mod ledger;

pub use account::Loan;
pub use early_payment::{apply_early_payment, EarlyPaymentOutcome};
pub use ledger::record_next_payment;
