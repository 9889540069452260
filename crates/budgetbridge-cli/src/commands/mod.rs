pub mod inflation;
pub mod loan;
pub mod schedule;
pub mod sensitivity;
