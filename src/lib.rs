pub mod decimal;
pub mod deposit;
pub mod errors;
pub mod events;
pub mod loan;
pub mod rates;
pub mod schedule;
pub mod store;
pub mod types;

// re-export key types
pub use decimal::{Money, Rate};
pub use deposit::{catch_up, project, CatchUpOutcome, Deposit, DpfProjection};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use loan::{apply_early_payment, record_next_payment, EarlyPaymentOutcome, Loan};
pub use schedule::{
    flat_payment, generate, import_schedule, GeneratedSchedule, ImportedSchedule, RawScheduleRow,
    ScheduleRow,
};
pub use store::{DepositStore, LoanStore, MemoryStore};
pub use types::{
    Currency, DepositId, EarlyPaymentMode, EarlyPaymentRecord, InterestKind, InterestRecord,
    LoanId, LoanKind, PaymentRecord, PayoutMode,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
