//! Treasury error types.
//!
//! Covers instrument parsing, document totals, mapping resolution and the
//! checkbook/check sub-machine.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::posting::MappingKey;

/// Errors that can occur during treasury operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreasuryError {
    // ========== Validation Errors ==========
    /// Instrument type is not cash/card/transfer/check.
    #[error("Invalid instrument type: {0}")]
    InvalidInstrumentType(String),

    /// A non-cash instrument needs its source resource id.
    #[error("Instrument {0} requires a source id")]
    InstrumentSourceRequired(&'static str),

    /// Document must have at least one item.
    #[error("Document must have at least one item")]
    ItemsRequired,

    /// Item amounts and totals must be positive.
    #[error("Invalid amount")]
    InvalidAmount,

    /// Sum of item amounts differs from the header total.
    #[error("Item total {sum} does not match document total {total}")]
    TotalMismatch {
        /// Header total.
        total: Decimal,
        /// Sum of items.
        sum: Decimal,
    },

    /// Cash or check items need a cashbox on the header.
    #[error("A cashbox is required for cash or check items")]
    CashboxRequired,

    /// Checkbook must have at least one page.
    #[error("Checkbook page count must be at least 1")]
    InvalidPageCount,

    /// Check number is not a positive integer.
    #[error("Invalid check number: {0}")]
    InvalidCheckNumber(String),

    /// Serial lies outside the checkbook range.
    #[error("Serial {serial} is outside checkbook range {first}..={last}")]
    SerialOutOfRange {
        /// Requested serial.
        serial: i64,
        /// First serial.
        first: i64,
        /// Last serial.
        last: i64,
    },

    /// Outgoing checks are issued from a checkbook.
    #[error("Outgoing checks require a checkbook")]
    CheckbookRequired,

    /// Check direction does not fit the document using it.
    #[error("Check {0} cannot be used in this document")]
    CheckDirectionMismatch(Uuid),

    // ========== Conflict Errors ==========
    /// Document was already sent to the ledger.
    #[error("Document already posted")]
    AlreadyPosted,

    /// Checkbook has no pages left.
    #[error("Checkbook is exhausted")]
    CheckbookExhausted,

    /// Serial already issued from this checkbook.
    #[error("Check number already issued: {0}")]
    DuplicateCheckNumber(String),

    /// Check has moved past its initial state.
    #[error("Check {0} can no longer be deleted")]
    CheckNotDeletable(Uuid),

    /// Document number already used in this fiscal year.
    #[error("Document number already exists: {0}")]
    DuplicateNumber(String),

    // ========== Configuration Errors ==========
    /// No code is configured for a mapping key.
    #[error("No code mapping configured for {0}")]
    MissingMapping(MappingKey),

    // ========== Not Found ==========
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Requested id.
        id: Uuid,
    },
}

impl TreasuryError {
    /// Returns the message key for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInstrumentType(_) => "invalidInstrumentType",
            Self::InstrumentSourceRequired(_) => "instrumentSourceRequired",
            Self::ItemsRequired => "itemsRequired",
            Self::InvalidAmount => "invalidAmount",
            Self::TotalMismatch { .. } => "totalMismatch",
            Self::CashboxRequired => "cashboxRequired",
            Self::InvalidPageCount => "invalidPageCount",
            Self::InvalidCheckNumber(_) => "invalidCheckNumber",
            Self::SerialOutOfRange { .. } => "serialOutOfRange",
            Self::CheckbookRequired => "checkbookRequired",
            Self::CheckDirectionMismatch(_) => "checkDirectionMismatch",
            Self::AlreadyPosted => "alreadyPosted",
            Self::CheckbookExhausted => "checkbookExhausted",
            Self::DuplicateCheckNumber(_) => "duplicateCheckNumber",
            Self::CheckNotDeletable(_) => "checkNotDeletable",
            Self::DuplicateNumber(_) => "duplicateNumber",
            Self::MissingMapping(_) => "missingMapping",
            Self::NotFound { .. } => "notFound",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidInstrumentType(_)
            | Self::InstrumentSourceRequired(_)
            | Self::ItemsRequired
            | Self::InvalidAmount
            | Self::TotalMismatch { .. }
            | Self::CashboxRequired
            | Self::InvalidPageCount
            | Self::InvalidCheckNumber(_)
            | Self::SerialOutOfRange { .. }
            | Self::CheckbookRequired
            | Self::CheckDirectionMismatch(_) => 400,

            Self::NotFound { .. } => 404,

            Self::AlreadyPosted
            | Self::CheckbookExhausted
            | Self::DuplicateCheckNumber(_)
            | Self::CheckNotDeletable(_)
            | Self::DuplicateNumber(_) => 409,

            Self::MissingMapping(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TreasuryError::CashboxRequired.http_status_code(), 400);
        assert_eq!(
            TreasuryError::TotalMismatch {
                total: Decimal::TEN,
                sum: Decimal::ONE
            }
            .http_status_code(),
            400
        );
        assert_eq!(TreasuryError::AlreadyPosted.http_status_code(), 409);
        assert_eq!(TreasuryError::CheckbookExhausted.http_status_code(), 409);
        assert_eq!(
            TreasuryError::MissingMapping(MappingKey::ReceiptCash).http_status_code(),
            500
        );
    }

    #[test]
    fn test_missing_mapping_names_key() {
        let err = TreasuryError::MissingMapping(MappingKey::PaymentCheck);
        assert_eq!(err.error_code(), "missingMapping");
        assert_eq!(
            err.to_string(),
            "No code mapping configured for PAYMENT_CHECK_CODE_ID"
        );
    }
}
