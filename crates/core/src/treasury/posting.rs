//! Turns a receipt or payment into journal lines.
//!
//! Code ids are never hard-coded: every line's code comes from a
//! [`MappingKey`] resolved by the caller (environment, settings store, then
//! configured fallback). Detail ids come from the instrument's handler
//! detail, or from the counterparty for checks.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::TreasuryError;
use super::instrument::InstrumentType;
use crate::ledger::JournalLine;

/// Which side of the treasury a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentDirection {
    /// Money in.
    Receipt,
    /// Money out.
    Payment,
}

impl DocumentDirection {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Payment => "payment",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Receipt => "Receipt",
            Self::Payment => "Payment",
        }
    }
}

/// Abstract account mapping used by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MappingKey {
    /// `RECEIPT_CASH_CODE_ID`
    ReceiptCash,
    /// `RECEIPT_TRANSFER_CODE_ID`
    ReceiptTransfer,
    /// `RECEIPT_CARD_CODE_ID`
    ReceiptCard,
    /// `RECEIPT_CHECK_CODE_ID`
    ReceiptCheck,
    /// `RECEIPT_COUNTERPARTY_CODE_ID`
    ReceiptCounterparty,
    /// `PAYMENT_CASH_CODE_ID`
    PaymentCash,
    /// `PAYMENT_TRANSFER_CODE_ID`
    PaymentTransfer,
    /// `PAYMENT_CARD_CODE_ID`
    PaymentCard,
    /// `PAYMENT_CHECK_CODE_ID`
    PaymentCheck,
    /// `PAYMENT_COUNTERPARTY_CODE_ID`
    PaymentCounterparty,
}

impl MappingKey {
    /// Every mapping key.
    pub const ALL: [Self; 10] = [
        Self::ReceiptCash,
        Self::ReceiptTransfer,
        Self::ReceiptCard,
        Self::ReceiptCheck,
        Self::ReceiptCounterparty,
        Self::PaymentCash,
        Self::PaymentTransfer,
        Self::PaymentCard,
        Self::PaymentCheck,
        Self::PaymentCounterparty,
    ];

    /// Environment variable / settings code for this key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReceiptCash => "RECEIPT_CASH_CODE_ID",
            Self::ReceiptTransfer => "RECEIPT_TRANSFER_CODE_ID",
            Self::ReceiptCard => "RECEIPT_CARD_CODE_ID",
            Self::ReceiptCheck => "RECEIPT_CHECK_CODE_ID",
            Self::ReceiptCounterparty => "RECEIPT_COUNTERPARTY_CODE_ID",
            Self::PaymentCash => "PAYMENT_CASH_CODE_ID",
            Self::PaymentTransfer => "PAYMENT_TRANSFER_CODE_ID",
            Self::PaymentCard => "PAYMENT_CARD_CODE_ID",
            Self::PaymentCheck => "PAYMENT_CHECK_CODE_ID",
            Self::PaymentCounterparty => "PAYMENT_COUNTERPARTY_CODE_ID",
        }
    }

    /// Parses a key name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|k| k.as_str() == upper)
    }

    /// Key for an item line of the given direction and instrument.
    #[must_use]
    pub fn for_instrument(direction: DocumentDirection, kind: InstrumentType) -> Self {
        match (direction, kind) {
            (DocumentDirection::Receipt, InstrumentType::Cash) => Self::ReceiptCash,
            (DocumentDirection::Receipt, InstrumentType::Transfer) => Self::ReceiptTransfer,
            (DocumentDirection::Receipt, InstrumentType::Card) => Self::ReceiptCard,
            (DocumentDirection::Receipt, InstrumentType::Check) => Self::ReceiptCheck,
            (DocumentDirection::Payment, InstrumentType::Cash) => Self::PaymentCash,
            (DocumentDirection::Payment, InstrumentType::Transfer) => Self::PaymentTransfer,
            (DocumentDirection::Payment, InstrumentType::Card) => Self::PaymentCard,
            (DocumentDirection::Payment, InstrumentType::Check) => Self::PaymentCheck,
        }
    }

    /// Key for the counterparty line.
    #[must_use]
    pub fn counterparty(direction: DocumentDirection) -> Self {
        match direction {
            DocumentDirection::Receipt => Self::ReceiptCounterparty,
            DocumentDirection::Payment => Self::PaymentCounterparty,
        }
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document item, with its instrument already resolved to a handler.
#[derive(Debug, Clone)]
pub struct PostingItem {
    /// Instrument type.
    pub instrument_type: InstrumentType,
    /// Item amount.
    pub amount: Decimal,
    /// Handler detail of the cashbox, bank account or card reader.
    pub handler_detail_id: Option<Uuid>,
    /// Due date for checks.
    pub due_date: Option<NaiveDate>,
    /// Free reference (transfer tracking no, check serial, ...).
    pub reference: Option<String>,
}

/// A receipt or payment ready to be posted.
#[derive(Debug, Clone)]
pub struct PostingDocument {
    /// Receipt or payment.
    pub direction: DocumentDirection,
    /// Document number.
    pub number: String,
    /// Counterparty detail.
    pub counterparty_detail_id: Uuid,
    /// Replaces the mapped counterparty code when set.
    pub counterparty_code_override: Option<Uuid>,
    /// Header total.
    pub total: Decimal,
    /// Items in position order.
    pub items: Vec<PostingItem>,
    /// Header description.
    pub description: Option<String>,
}

impl PostingDocument {
    /// Journal description for the posted document.
    #[must_use]
    pub fn journal_description(&self) -> String {
        match self.description.as_deref().filter(|d| !d.is_empty()) {
            Some(d) => format!("{} {}: {d}", self.direction.label(), self.number),
            None => format!("{} {}", self.direction.label(), self.number),
        }
    }
}

/// Stateless treasury-to-ledger line builder.
pub struct PostingService;

impl PostingService {
    /// Mapping keys needed to post `doc`, deduplicated and sorted.
    #[must_use]
    pub fn required_keys(doc: &PostingDocument) -> Vec<MappingKey> {
        let mut keys: Vec<MappingKey> = doc
            .items
            .iter()
            .map(|item| MappingKey::for_instrument(doc.direction, item.instrument_type))
            .collect();
        if doc.counterparty_code_override.is_none() {
            keys.push(MappingKey::counterparty(doc.direction));
        }
        keys.sort();
        keys.dedup();
        keys
    }

    /// Builds the journal lines for a document.
    ///
    /// Receipts debit one line per item and credit the counterparty with the
    /// total. Payments debit the counterparty with the total and credit one
    /// line per item. The caller validates that items sum to the total.
    pub fn build_lines<F>(doc: &PostingDocument, resolve: F) -> Result<Vec<JournalLine>, TreasuryError>
    where
        F: Fn(MappingKey) -> Result<Uuid, TreasuryError>,
    {
        let counterparty_code = match doc.counterparty_code_override {
            Some(code) => code,
            None => resolve(MappingKey::counterparty(doc.direction))?,
        };
        let label = doc.direction.label();

        let mut item_lines = Vec::with_capacity(doc.items.len());
        for item in &doc.items {
            let code_id = resolve(MappingKey::for_instrument(doc.direction, item.instrument_type))?;
            let detail_id = Self::item_detail(doc, item)?;
            let description = Self::item_description(label, &doc.number, item);

            let line = match doc.direction {
                DocumentDirection::Receipt => JournalLine::debit(code_id, Some(detail_id), item.amount),
                DocumentDirection::Payment => JournalLine::credit(code_id, Some(detail_id), item.amount),
            };
            item_lines.push(line.with_description(description));
        }

        let counterparty_description = format!("{label} {}", doc.number);
        let mut lines = Vec::with_capacity(item_lines.len() + 1);
        match doc.direction {
            DocumentDirection::Receipt => {
                lines.extend(item_lines);
                lines.push(
                    JournalLine::credit(counterparty_code, Some(doc.counterparty_detail_id), doc.total)
                        .with_description(counterparty_description),
                );
            }
            DocumentDirection::Payment => {
                lines.push(
                    JournalLine::debit(counterparty_code, Some(doc.counterparty_detail_id), doc.total)
                        .with_description(counterparty_description),
                );
                lines.extend(item_lines);
            }
        }
        Ok(lines)
    }

    fn item_detail(doc: &PostingDocument, item: &PostingItem) -> Result<Uuid, TreasuryError> {
        match item.instrument_type {
            InstrumentType::Check => Ok(doc.counterparty_detail_id),
            InstrumentType::Cash => item.handler_detail_id.ok_or(TreasuryError::CashboxRequired),
            kind => item
                .handler_detail_id
                .ok_or(TreasuryError::InstrumentSourceRequired(kind.as_str())),
        }
    }

    fn item_description(label: &str, number: &str, item: &PostingItem) -> String {
        let mut description = format!("{label} {number} - {}", item.instrument_type);
        if let Some(reference) = item.reference.as_deref().filter(|r| !r.is_empty()) {
            description.push_str(&format!(" {reference}"));
        }
        if item.instrument_type == InstrumentType::Check
            && let Some(due) = item.due_date
        {
            description.push_str(&format!(" due {}", due.format("%Y-%m-%d")));
        }
        description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::JournalTotals;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn mapping() -> HashMap<MappingKey, Uuid> {
        MappingKey::ALL.into_iter().map(|k| (k, Uuid::new_v4())).collect()
    }

    fn item(kind: InstrumentType, amount: Decimal, handler: Option<Uuid>) -> PostingItem {
        PostingItem {
            instrument_type: kind,
            amount,
            handler_detail_id: handler,
            due_date: None,
            reference: None,
        }
    }

    fn doc(direction: DocumentDirection, items: Vec<PostingItem>) -> PostingDocument {
        let total = items.iter().map(|i| i.amount).sum();
        PostingDocument {
            direction,
            number: "7".into(),
            counterparty_detail_id: Uuid::new_v4(),
            counterparty_code_override: None,
            total,
            items,
            description: None,
        }
    }

    #[test]
    fn test_key_names_roundtrip() {
        for key in MappingKey::ALL {
            assert_eq!(MappingKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(
            MappingKey::parse("receipt_cash_code_id"),
            Some(MappingKey::ReceiptCash)
        );
        assert_eq!(MappingKey::parse("RECEIPT_GOLD_CODE_ID"), None);
    }

    #[test]
    fn test_receipt_lines() {
        let map = mapping();
        let cashbox = Uuid::new_v4();
        let mut check = item(InstrumentType::Check, dec!(40), None);
        check.due_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        let receipt = doc(
            DocumentDirection::Receipt,
            vec![item(InstrumentType::Cash, dec!(60), Some(cashbox)), check],
        );

        let lines = PostingService::build_lines(&receipt, |k| Ok(map[&k])).unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].code_id, map[&MappingKey::ReceiptCash]);
        assert_eq!(lines[0].detail_id, Some(cashbox));
        assert_eq!(lines[0].debit, dec!(60));
        assert_eq!(lines[1].code_id, map[&MappingKey::ReceiptCheck]);
        assert_eq!(lines[1].detail_id, Some(receipt.counterparty_detail_id));
        assert!(lines[1].description.as_deref().unwrap().contains("2026-03-01"));
        assert_eq!(lines[2].code_id, map[&MappingKey::ReceiptCounterparty]);
        assert_eq!(lines[2].credit, dec!(100));
        assert!(JournalTotals::from_lines(&lines).unwrap().is_balanced);
    }

    #[test]
    fn test_payment_lines_mirror_receipt() {
        let map = mapping();
        let bank = Uuid::new_v4();
        let payment = doc(
            DocumentDirection::Payment,
            vec![item(InstrumentType::Transfer, dec!(25), Some(bank))],
        );

        let lines = PostingService::build_lines(&payment, |k| Ok(map[&k])).unwrap();

        assert_eq!(lines[0].code_id, map[&MappingKey::PaymentCounterparty]);
        assert_eq!(lines[0].debit, dec!(25));
        assert_eq!(lines[1].code_id, map[&MappingKey::PaymentTransfer]);
        assert_eq!(lines[1].detail_id, Some(bank));
        assert_eq!(lines[1].credit, dec!(25));
    }

    #[test]
    fn test_override_skips_counterparty_key() {
        let special = Uuid::new_v4();
        let mut receipt = doc(
            DocumentDirection::Receipt,
            vec![item(InstrumentType::Card, dec!(5), Some(Uuid::new_v4()))],
        );
        receipt.counterparty_code_override = Some(special);

        assert_eq!(
            PostingService::required_keys(&receipt),
            vec![MappingKey::ReceiptCard]
        );
        let lines = PostingService::build_lines(&receipt, |k| match k {
            MappingKey::ReceiptCard => Ok(Uuid::nil()),
            other => Err(TreasuryError::MissingMapping(other)),
        })
        .unwrap();
        assert_eq!(lines[1].code_id, special);
    }

    #[test]
    fn test_missing_mapping_propagates() {
        let receipt = doc(
            DocumentDirection::Receipt,
            vec![item(InstrumentType::Card, dec!(5), Some(Uuid::new_v4()))],
        );
        assert_eq!(
            PostingService::build_lines(&receipt, |k| Err(TreasuryError::MissingMapping(k)))
                .unwrap_err(),
            TreasuryError::MissingMapping(MappingKey::ReceiptCounterparty)
        );
    }

    #[test]
    fn test_cash_without_handler() {
        let map = mapping();
        let receipt = doc(
            DocumentDirection::Receipt,
            vec![item(InstrumentType::Cash, dec!(5), None)],
        );
        assert_eq!(
            PostingService::build_lines(&receipt, |k| Ok(map[&k])).unwrap_err(),
            TreasuryError::CashboxRequired
        );
    }

    #[test]
    fn test_journal_description() {
        let mut receipt = doc(DocumentDirection::Receipt, vec![]);
        assert_eq!(receipt.journal_description(), "Receipt 7");
        receipt.description = Some("Rent".into());
        assert_eq!(receipt.journal_description(), "Receipt 7: Rent");
    }
}
