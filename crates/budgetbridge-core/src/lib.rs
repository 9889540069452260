pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "inflation")]
pub mod inflation;

pub use amortization::params::{LoanInput, LoanParameters};
pub use amortization::schedule::{build_schedule, Schedule, ScheduleRow, ScheduleWarning};
pub use error::BudgetBridgeError;
pub use types::*;

/// Standard result type for all budgetbridge operations
pub type BudgetBridgeResult<T> = Result<T, BudgetBridgeError>;
