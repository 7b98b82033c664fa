//! Domain types for journals.
//!
//! A journal moves through `draft → temporary → permanent`. Saves never
//! block on the balance rule; they only decide between draft and temporary.
//! Posting is the single gate that requires debits to equal credits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::LedgerError;

/// Largest difference between total debit and total credit still treated as balanced.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Exclusive upper bound of a stored amount: `NUMERIC(20, 4)` keeps 16 integer digits.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_874_919_424, 2_328_306, 0, false, 0);

/// Journal lifecycle state.
///
/// The valid transitions are:
/// - Draft ⇄ Temporary (on save, by balance)
/// - Temporary → Permanent (post, bulk-post)
/// - Permanent is terminal; it can only be countered by a reversal journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Unbalanced or explicitly held back.
    Draft,
    /// Balanced, awaiting posting.
    Temporary,
    /// Posted; immutable.
    Permanent,
}

impl JournalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Temporary => "temporary",
            Self::Permanent => "permanent",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "temporary" => Some(Self::Temporary),
            "permanent" => Some(Self::Permanent),
            _ => None,
        }
    }

    /// Returns true if the journal can still be edited or deleted.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        !matches!(self, Self::Permanent)
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single journal item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account code (specific level).
    pub code_id: Uuid,
    /// Optional detail account.
    pub detail_id: Option<Uuid>,
    /// Optional counterparty reference.
    pub party_id: Option<Uuid>,
    /// Debit amount (>= 0).
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount (>= 0).
    #[serde(default)]
    pub credit: Decimal,
    /// Line description.
    pub description: Option<String>,
}

impl JournalLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(code_id: Uuid, detail_id: Option<Uuid>, amount: Decimal) -> Self {
        Self {
            code_id,
            detail_id,
            party_id: None,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(code_id: Uuid, detail_id: Option<Uuid>, amount: Decimal) -> Self {
        Self {
            code_id,
            detail_id,
            party_id: None,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Sets the line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Summed debit/credit of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalTotals {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// `total_debit - total_credit`.
    pub difference: Decimal,
    /// `|difference| <= BALANCE_TOLERANCE`.
    pub is_balanced: bool,
}

impl JournalTotals {
    /// Sums the given lines.
    ///
    /// Fails with [`LedgerError::InvalidAmount`] when a sum leaves the
    /// `Decimal` range.
    pub fn from_lines(lines: &[JournalLine]) -> Result<Self, LedgerError> {
        let (total_debit, total_credit) = lines.iter().try_fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(d, c), line| {
                Some((d.checked_add(line.debit)?, c.checked_add(line.credit)?))
            },
        )
        .ok_or(LedgerError::InvalidAmount)?;
        let difference = total_debit
            .checked_sub(total_credit)
            .ok_or(LedgerError::InvalidAmount)?;
        Ok(Self {
            total_debit,
            total_credit,
            difference,
            is_balanced: difference.abs() <= BALANCE_TOLERANCE,
        })
    }
}

/// Input for the two-line auto journal.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoJournalInput {
    /// Code debited.
    pub debit_code_id: Uuid,
    /// Detail debited.
    pub debit_detail_id: Option<Uuid>,
    /// Code credited.
    pub credit_code_id: Uuid,
    /// Detail credited.
    pub credit_detail_id: Option<Uuid>,
    /// Amount moved (> 0).
    pub amount: Decimal,
    /// Description copied to both lines.
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tolerance_constant() {
        assert_eq!(BALANCE_TOLERANCE, dec!(0.0001));
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!(JournalStatus::parse("Permanent"), Some(JournalStatus::Permanent));
        assert_eq!(JournalStatus::parse("posted"), None);
        assert_eq!(JournalStatus::Temporary.to_string(), "temporary");
        assert!(JournalStatus::Draft.is_editable());
        assert!(!JournalStatus::Permanent.is_editable());
    }

    #[test]
    fn test_totals_within_tolerance() {
        let code = Uuid::new_v4();
        let lines = vec![
            JournalLine::debit(code, None, dec!(100.00005)),
            JournalLine::credit(code, None, dec!(100)),
        ];
        let totals = JournalTotals::from_lines(&lines).unwrap();
        assert!(totals.is_balanced);
        assert_eq!(totals.difference, dec!(0.00005));
    }

    #[test]
    fn test_totals_outside_tolerance() {
        let code = Uuid::new_v4();
        let lines = vec![
            JournalLine::debit(code, None, dec!(100.0002)),
            JournalLine::credit(code, None, dec!(100)),
        ];
        assert!(!JournalTotals::from_lines(&lines).unwrap().is_balanced);
    }

    #[test]
    fn test_totals_overflow_is_invalid_amount() {
        let code = Uuid::new_v4();
        let half = Decimal::MAX / dec!(2) + Decimal::ONE;
        let lines = vec![
            JournalLine::debit(code, None, half),
            JournalLine::debit(code, None, half),
        ];
        assert_eq!(
            JournalTotals::from_lines(&lines),
            Err(LedgerError::InvalidAmount)
        );
    }

    #[test]
    fn test_max_amount_matches_column_range() {
        assert_eq!(MAX_AMOUNT, dec!(10000000000000000));
    }

    #[test]
    fn test_empty_totals() {
        let totals = JournalTotals::from_lines(&[]).unwrap();
        assert_eq!(totals.total_debit, Decimal::ZERO);
        assert!(totals.is_balanced);
    }
}
