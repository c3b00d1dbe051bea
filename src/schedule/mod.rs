pub mod generator;
pub mod import;

pub use generator::{flat_payment, generate, GeneratedSchedule, ScheduleRow};
pub use import::{import_schedule, parse_amount, ImportedSchedule, RawScheduleRow};
