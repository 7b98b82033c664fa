//! Checks and checkbooks.
//!
//! Outgoing checks are issued from a checkbook serial range; the checkbook
//! flips to exhausted when its last serial is issued. Incoming checks start
//! as `created` and move into the cashbox when a receipt is posted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::TreasuryError;
use super::posting::DocumentDirection;
use crate::ledger::is_sequence_value;

/// Direction of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    /// Received from a counterparty.
    Incoming,
    /// Issued from one of our checkbooks.
    Outgoing,
}

/// Check state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Incoming, registered.
    Created,
    /// Outgoing, written from a checkbook.
    Issued,
    /// Incoming, held in a cashbox after a posted receipt.
    #[serde(rename = "incashbox")]
    InCashbox,
}

/// Checkbook state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckbookStatus {
    /// Serials still available.
    Active,
    /// Last serial issued.
    Exhausted,
}

/// Serial range of a checkbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckbookSpan {
    /// First serial.
    pub start_number: i64,
    /// Number of pages.
    pub page_count: i32,
    last_number: i64,
}

impl CheckbookSpan {
    /// Validates and builds a span.
    pub fn new(start_number: i64, page_count: i32) -> Result<Self, TreasuryError> {
        if page_count < 1 {
            return Err(TreasuryError::InvalidPageCount);
        }
        if start_number < 1 {
            return Err(TreasuryError::InvalidCheckNumber(start_number.to_string()));
        }
        let last_number = start_number
            .checked_add(i64::from(page_count) - 1)
            .ok_or_else(|| TreasuryError::InvalidCheckNumber(start_number.to_string()))?;
        Ok(Self {
            start_number,
            page_count,
            last_number,
        })
    }

    /// Last serial in the book.
    #[must_use]
    pub const fn last_number(&self) -> i64 {
        self.last_number
    }

    /// Whether `serial` belongs to this book.
    #[must_use]
    pub fn contains(&self, serial: i64) -> bool {
        (self.start_number..=self.last_number()).contains(&serial)
    }

    /// Whether `serial` is the last page.
    #[must_use]
    pub fn is_last(&self, serial: i64) -> bool {
        serial == self.last_number()
    }
}

/// Stateless check rules.
pub struct CheckService;

impl CheckService {
    /// Status a new check starts in.
    #[must_use]
    pub fn initial_status(check_type: CheckType) -> CheckStatus {
        match check_type {
            CheckType::Incoming => CheckStatus::Created,
            CheckType::Outgoing => CheckStatus::Issued,
        }
    }

    /// Parses a check serial: digits only, positive.
    pub fn parse_serial(raw: &str) -> Result<i64, TreasuryError> {
        let trimmed = raw.trim();
        if !is_sequence_value(trimmed) {
            return Err(TreasuryError::InvalidCheckNumber(raw.to_string()));
        }
        match trimmed.parse::<i64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(TreasuryError::InvalidCheckNumber(raw.to_string())),
        }
    }

    /// Validates issuing `serial` from a checkbook.
    ///
    /// Returns `true` when issuing it exhausts the book.
    pub fn validate_issue(
        span: &CheckbookSpan,
        status: CheckbookStatus,
        serial: i64,
    ) -> Result<bool, TreasuryError> {
        if status == CheckbookStatus::Exhausted {
            return Err(TreasuryError::CheckbookExhausted);
        }
        if !span.contains(serial) {
            return Err(TreasuryError::SerialOutOfRange {
                serial,
                first: span.start_number,
                last: span.last_number(),
            });
        }
        Ok(span.is_last(serial))
    }

    /// Only checks still in their initial state can be deleted.
    #[must_use]
    pub fn can_delete(check_type: CheckType, status: CheckStatus) -> bool {
        status == Self::initial_status(check_type)
    }

    /// Errors with `CheckNotDeletable` unless [`Self::can_delete`].
    pub fn ensure_deletable(
        id: Uuid,
        check_type: CheckType,
        status: CheckStatus,
    ) -> Result<(), TreasuryError> {
        if Self::can_delete(check_type, status) {
            Ok(())
        } else {
            Err(TreasuryError::CheckNotDeletable(id))
        }
    }

    /// Receipts take incoming checks, payments take outgoing ones.
    pub fn ensure_direction(
        id: Uuid,
        direction: DocumentDirection,
        check_type: CheckType,
    ) -> Result<(), TreasuryError> {
        match (direction, check_type) {
            (DocumentDirection::Receipt, CheckType::Incoming)
            | (DocumentDirection::Payment, CheckType::Outgoing) => Ok(()),
            _ => Err(TreasuryError::CheckDirectionMismatch(id)),
        }
    }

    /// New status for a check referenced by a posted receipt, if it moves.
    #[must_use]
    pub fn status_after_receipt(
        check_type: CheckType,
        status: CheckStatus,
        has_checkbook: bool,
    ) -> Option<CheckStatus> {
        (check_type == CheckType::Incoming && status == CheckStatus::Created && !has_checkbook)
            .then_some(CheckStatus::InCashbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_span_bounds() {
        let span = CheckbookSpan::new(1001, 10).unwrap();
        assert_eq!(span.last_number(), 1010);
        assert!(span.contains(1001));
        assert!(span.contains(1010));
        assert!(!span.contains(1011));
        assert!(span.is_last(1010));
    }

    #[test]
    fn test_span_rejects_serials_past_i64() {
        assert_eq!(
            CheckbookSpan::new(i64::MAX, 2),
            Err(TreasuryError::InvalidCheckNumber(i64::MAX.to_string()))
        );
        let single = CheckbookSpan::new(i64::MAX, 1).unwrap();
        assert_eq!(single.last_number(), i64::MAX);
        assert!(single.is_last(i64::MAX));
    }

    #[test]
    fn test_span_rejects_empty_book() {
        assert_eq!(CheckbookSpan::new(1, 0), Err(TreasuryError::InvalidPageCount));
    }

    #[test]
    fn test_issue_last_serial_exhausts() {
        let span = CheckbookSpan::new(1001, 10).unwrap();
        assert_eq!(
            CheckService::validate_issue(&span, CheckbookStatus::Active, 1005),
            Ok(false)
        );
        assert_eq!(
            CheckService::validate_issue(&span, CheckbookStatus::Active, 1010),
            Ok(true)
        );
        assert_eq!(
            CheckService::validate_issue(&span, CheckbookStatus::Exhausted, 1002),
            Err(TreasuryError::CheckbookExhausted)
        );
        assert_eq!(
            CheckService::validate_issue(&span, CheckbookStatus::Active, 1011),
            Err(TreasuryError::SerialOutOfRange {
                serial: 1011,
                first: 1001,
                last: 1010
            })
        );
    }

    #[rstest]
    #[case("42", Ok(42))]
    #[case(" 0007 ", Ok(7))]
    #[case("0", Err(TreasuryError::InvalidCheckNumber("0".into())))]
    #[case("A-12", Err(TreasuryError::InvalidCheckNumber("A-12".into())))]
    fn test_parse_serial(#[case] raw: &str, #[case] expected: Result<i64, TreasuryError>) {
        assert_eq!(CheckService::parse_serial(raw), expected);
    }

    #[test]
    fn test_deletable_only_in_initial_state() {
        assert!(CheckService::can_delete(CheckType::Outgoing, CheckStatus::Issued));
        assert!(CheckService::can_delete(CheckType::Incoming, CheckStatus::Created));
        assert!(!CheckService::can_delete(CheckType::Incoming, CheckStatus::InCashbox));
        assert!(CheckService::ensure_deletable(
            Uuid::nil(),
            CheckType::Incoming,
            CheckStatus::InCashbox
        )
        .is_err());
    }

    #[test]
    fn test_status_after_receipt() {
        assert_eq!(
            CheckService::status_after_receipt(CheckType::Incoming, CheckStatus::Created, false),
            Some(CheckStatus::InCashbox)
        );
        assert_eq!(
            CheckService::status_after_receipt(CheckType::Incoming, CheckStatus::Created, true),
            None
        );
        assert_eq!(
            CheckService::status_after_receipt(CheckType::Outgoing, CheckStatus::Issued, false),
            None
        );
    }

    #[test]
    fn test_direction() {
        let id = Uuid::nil();
        assert!(CheckService::ensure_direction(id, DocumentDirection::Receipt, CheckType::Incoming).is_ok());
        assert_eq!(
            CheckService::ensure_direction(id, DocumentDirection::Receipt, CheckType::Outgoing),
            Err(TreasuryError::CheckDirectionMismatch(id))
        );
    }
}
