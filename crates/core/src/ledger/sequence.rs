//! Sequence numbers (`ref_no`, `code`, document numbers).
//!
//! Sequences are max-plus-one over the digit-only values of a column, scoped
//! by fiscal year. Values with any non-digit character (e.g. `REV-12`) are
//! ignored when computing the maximum.

use uuid::Uuid;

/// Regular expression matching values that take part in a sequence.
pub const SEQUENCE_PATTERN: &str = "^[0-9]+$";

/// Returns true when `value` is a non-empty run of ASCII digits.
#[must_use]
pub fn is_sequence_value(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// The next value after the current maximum; sequences start at 1.
#[must_use]
pub fn next_sequence_value(current_max: Option<i64>) -> i64 {
    current_max.map_or(1, |max| max.saturating_add(1))
}

/// A numbered column scoped to a fiscal year (or global when `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceScope {
    /// Table name.
    pub table: &'static str,
    /// Column name.
    pub column: &'static str,
    /// Fiscal year scope.
    pub fiscal_year_id: Option<Uuid>,
}

impl SequenceScope {
    /// Creates a fiscal-year scoped sequence.
    #[must_use]
    pub const fn new(table: &'static str, column: &'static str, fiscal_year_id: Option<Uuid>) -> Self {
        Self {
            table,
            column,
            fiscal_year_id,
        }
    }

    /// Stable text key for transaction-scoped advisory locking.
    #[must_use]
    pub fn lock_key(&self) -> String {
        match self.fiscal_year_id {
            Some(fy) => format!("seq:{}.{}:{fy}", self.table, self.column),
            None => format!("seq:{}.{}", self.table, self.column),
        }
    }
}
