//! Fixed-rate, fully-amortising loans: parameter validation and the
//! period-by-period schedule builder.

pub mod params;
pub mod schedule;
