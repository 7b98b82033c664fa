//! Property-based tests for the treasury bridge and checkbooks.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use super::check::{CheckService, CheckbookSpan, CheckbookStatus};
use super::document::validate_document;
use super::instrument::InstrumentType;
use super::posting::{DocumentDirection, MappingKey, PostingDocument, PostingItem, PostingService};
use crate::ledger::JournalTotals;

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_instrument() -> impl Strategy<Value = InstrumentType> {
    prop::sample::select(InstrumentType::ALL.to_vec())
}

fn arb_direction() -> impl Strategy<Value = DocumentDirection> {
    prop_oneof![Just(DocumentDirection::Receipt), Just(DocumentDirection::Payment)]
}

fn arb_document() -> impl Strategy<Value = PostingDocument> {
    (
        arb_direction(),
        prop::collection::vec((arb_instrument(), arb_amount()), 1..8),
    )
        .prop_map(|(direction, items)| {
            let items: Vec<PostingItem> = items
                .into_iter()
                .map(|(kind, amount)| PostingItem {
                    instrument_type: kind,
                    amount,
                    handler_detail_id: Some(Uuid::new_v4()),
                    due_date: None,
                    reference: None,
                })
                .collect();
            PostingDocument {
                direction,
                number: "1".into(),
                counterparty_detail_id: Uuid::new_v4(),
                counterparty_code_override: None,
                total: items.iter().map(|i| i.amount).sum(),
                items,
                description: None,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_valid_document_posts_balanced(doc in arb_document()) {
        let items = doc.items.iter().map(|i| (i.instrument_type, i.amount));
        prop_assert!(validate_document(doc.total, items, true).is_ok());

        let map: HashMap<MappingKey, Uuid> =
            MappingKey::ALL.into_iter().map(|k| (k, Uuid::new_v4())).collect();
        let lines = PostingService::build_lines(&doc, |k| Ok(map[&k])).unwrap();

        prop_assert_eq!(lines.len(), doc.items.len() + 1);
        let totals = JournalTotals::from_lines(&lines).unwrap();
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.total_debit, doc.total);
    }

    #[test]
    fn prop_required_keys_cover_every_lookup(doc in arb_document()) {
        let keys = PostingService::required_keys(&doc);
        let lines = PostingService::build_lines(&doc, |k| {
            if keys.contains(&k) {
                Ok(Uuid::nil())
            } else {
                Err(super::error::TreasuryError::MissingMapping(k))
            }
        });
        prop_assert!(lines.is_ok());
    }

    #[test]
    fn prop_only_last_serial_exhausts(
        start in 1i64..1_000_000,
        pages in 1i32..200,
        offset in 0i32..200,
    ) {
        let span = CheckbookSpan::new(start, pages).unwrap();
        let serial = start + i64::from(offset);
        let result = CheckService::validate_issue(&span, CheckbookStatus::Active, serial);
        if offset < pages {
            prop_assert_eq!(result, Ok(offset == pages - 1));
        } else {
            prop_assert!(result.is_err());
        }
    }
}
