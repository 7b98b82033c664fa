//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur during journal operations:
//! line validation, the balance rule at posting time and lifecycle
//! violations.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal must have at least one item.
    #[error("Journal must have at least one item")]
    ItemsRequired,

    /// Amounts must be non-negative (and positive where a single amount is given).
    #[error("Invalid amount")]
    InvalidAmount,

    /// Referenced code does not exist.
    #[error("Code not found: {0}")]
    InvalidCode(Uuid),

    /// Journal is not balanced (debits != credits).
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },

    /// Filter parameters are malformed.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    // ========== State Errors ==========
    /// Cannot modify a permanent journal.
    #[error("Cannot modify posted journal")]
    CannotModifyPosted,

    /// Only permanent journals can be reversed.
    #[error("Only posted journals can be reversed")]
    CanOnlyReversePosted,

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(Uuid),

    // ========== Conflict Errors ==========
    /// Reference number already used in this fiscal year.
    #[error("Reference number already exists in fiscal year: {0}")]
    DuplicateRefNo(String),
}

impl LedgerError {
    /// Returns the message key for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ItemsRequired => "itemsRequired",
            Self::InvalidAmount => "invalidAmount",
            Self::InvalidCode(_) => "invalidCode",
            Self::Unbalanced { .. } => "unbalanced",
            Self::InvalidFilter(_) => "invalidFilter",
            Self::CannotModifyPosted => "cannotModifyPosted",
            Self::CanOnlyReversePosted => "canOnlyReversePosted",
            Self::JournalNotFound(_) => "notFound",
            Self::DuplicateRefNo(_) => "duplicateRefNo",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::ItemsRequired
            | Self::InvalidAmount
            | Self::InvalidCode(_)
            | Self::Unbalanced { .. }
            | Self::InvalidFilter(_) => 400,

            // 404 Not Found
            Self::JournalNotFound(_) => 404,

            // 409 Conflict - lifecycle and uniqueness
            Self::CannotModifyPosted | Self::CanOnlyReversePosted | Self::DuplicateRefNo(_) => {
                409
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::ItemsRequired.error_code(), "itemsRequired");
        assert_eq!(
            LedgerError::Unbalanced {
                debit: Decimal::new(100, 0),
                credit: Decimal::new(90, 0),
            }
            .error_code(),
            "unbalanced"
        );
        assert_eq!(LedgerError::CannotModifyPosted.error_code(), "cannotModifyPosted");
        assert_eq!(LedgerError::DuplicateRefNo("7".into()).error_code(), "duplicateRefNo");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::ItemsRequired.http_status_code(), 400);
        assert_eq!(
            LedgerError::Unbalanced {
                debit: Decimal::ONE,
                credit: Decimal::ZERO,
            }
            .http_status_code(),
            400
        );
        assert_eq!(LedgerError::JournalNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(LedgerError::CannotModifyPosted.http_status_code(), 409);
        assert_eq!(LedgerError::CanOnlyReversePosted.http_status_code(), 409);
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(9000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Journal is not balanced. Debit: 100.00, Credit: 90.00"
        );
    }
}
