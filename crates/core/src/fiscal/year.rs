//! Fiscal year rules.
//!
//! At most one fiscal year is open at any time. The database enforces that
//! with a partial unique index; the rules here decide date ranges, the next
//! year's span and which neighbor takes over when the open year is deleted.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FiscalError;

/// Fiscal year definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name (e.g. "2026").
    pub name: String,
    /// First day of the year.
    pub start_date: NaiveDate,
    /// Last day of the year (inclusive).
    pub end_date: NaiveDate,
    /// Whether the year is closed.
    pub is_closed: bool,
}

impl FiscalYear {
    /// Returns true if this is the open year.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.is_closed
    }
}

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalSpan {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

/// Stateless fiscal year rules.
pub struct FiscalService;

impl FiscalService {
    /// Validates that `start` is strictly before `end`.
    pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), FiscalError> {
        if start >= end {
            return Err(FiscalError::InvalidDateRange);
        }
        Ok(())
    }

    /// Span of the year following one that ends on `end`:
    /// `[end + 1 day, end + 1 day + 1 year - 1 day]`.
    pub fn next_span(end: NaiveDate) -> Result<FiscalSpan, FiscalError> {
        let start = end.succ_opt().ok_or(FiscalError::DateOutOfRange)?;
        let end = start
            .checked_add_months(Months::new(12))
            .and_then(|d| d.pred_opt())
            .ok_or(FiscalError::DateOutOfRange)?;
        Ok(FiscalSpan { start, end })
    }

    /// Default name for a year starting on `start`.
    #[must_use]
    pub fn default_name(start: NaiveDate) -> String {
        start.year().to_string()
    }

    /// Validates an `open_next` request and returns the span to create.
    ///
    /// The source must be closed and no year may already start on the
    /// computed start date.
    pub fn plan_open_next(
        source: &FiscalYear,
        existing_starts: &[NaiveDate],
    ) -> Result<FiscalSpan, FiscalError> {
        if source.is_open() {
            return Err(FiscalError::YearNotClosed(source.id));
        }
        let span = Self::next_span(source.end_date)?;
        if existing_starts.contains(&span.start) {
            return Err(FiscalError::NextYearExists(span.start));
        }
        Ok(span)
    }

    /// Picks the year to open after deleting `deleted`: the closest earlier
    /// year by start date, otherwise the closest later one.
    #[must_use]
    pub fn nearest_neighbor(deleted: &FiscalYear, others: &[FiscalYear]) -> Option<Uuid> {
        let earlier = others
            .iter()
            .filter(|y| y.id != deleted.id && y.start_date < deleted.start_date)
            .max_by_key(|y| y.start_date);
        let later = || {
            others
                .iter()
                .filter(|y| y.id != deleted.id && y.start_date > deleted.start_date)
                .min_by_key(|y| y.start_date)
        };
        earlier.or_else(later).map(|y| y.id)
    }
}
