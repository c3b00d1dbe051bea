pub mod account;
pub mod accrual;
pub mod projection;

pub use account::Deposit;
pub use accrual::{catch_up, CatchUpOutcome};
pub use projection::{project, DpfProjection};
