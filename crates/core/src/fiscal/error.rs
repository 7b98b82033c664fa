//! Fiscal year errors.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during fiscal year operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FiscalError {
    /// Start date must be before end date.
    #[error("Start date must be before end date")]
    InvalidDateRange,

    /// Fiscal year overlaps with an existing year.
    #[error("Fiscal year overlaps with existing year: {0}")]
    OverlappingYear(String),

    /// Fiscal year not found.
    #[error("Fiscal year not found: {0}")]
    YearNotFound(Uuid),

    /// Fiscal year is referenced by documents.
    #[error("Fiscal year {0} is referenced by documents")]
    YearInUse(Uuid),

    /// `open_next` requires the source year to be closed.
    #[error("Fiscal year {0} must be closed first")]
    YearNotClosed(Uuid),

    /// A year already starts on the computed next start date.
    #[error("A fiscal year starting on {0} already exists")]
    NextYearExists(NaiveDate),

    /// Another year was opened by a concurrent request.
    #[error("Fiscal year {0} could not be opened: another year was opened concurrently")]
    OpenConflict(Uuid),

    /// No fiscal year is open and none was given.
    #[error("No open fiscal year")]
    NoOpenYear,

    /// Date arithmetic left the supported calendar range.
    #[error("Date out of range")]
    DateOutOfRange,
}

impl FiscalError {
    /// Returns the message key for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange | Self::DateOutOfRange => "invalidDateRange",
            Self::OverlappingYear(_) => "overlappingYear",
            Self::YearNotFound(_) => "notFound",
            Self::YearInUse(_) => "fiscalYearInUse",
            Self::YearNotClosed(_) => "fiscalYearNotClosed",
            Self::NextYearExists(_) => "nextYearExists",
            Self::OpenConflict(_) => "fiscalYearOpenConflict",
            Self::NoOpenYear => "noOpenFiscalYear",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange | Self::DateOutOfRange | Self::NoOpenYear => 400,
            Self::YearNotFound(_) => 404,
            Self::OverlappingYear(_)
            | Self::YearInUse(_)
            | Self::YearNotClosed(_)
            | Self::NextYearExists(_)
            | Self::OpenConflict(_) => 409,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_conflict_is_conflict() {
        let err = FiscalError::OpenConflict(Uuid::nil());
        assert_eq!(err.error_code(), "fiscalYearOpenConflict");
        assert_eq!(err.http_status_code(), 409);
    }
}
