//! Fiscal year management.

pub mod error;
pub mod year;

#[cfg(test)]
mod year_props;

pub use error::FiscalError;
pub use year::{FiscalService, FiscalSpan, FiscalYear};
