//! Property-based tests for ReversalService.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::reversal::{ReversalService, ReversalSource};
use super::types::{JournalLine, JournalTotals};

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec(
        (
            arb_uuid(),
            prop::option::of(arb_uuid()),
            arb_amount(),
            any::<bool>(),
            prop::option::of("[a-zA-Z ]{0,20}"),
        ),
        1..8,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(code, detail, amount, is_debit, memo)| {
                let mut line = if is_debit {
                    JournalLine::debit(code, detail, amount)
                } else {
                    JournalLine::credit(code, detail, amount)
                };
                line.description = memo;
                line
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_reversal_swaps_totals(lines in arb_lines(), id in arb_uuid()) {
        let reversed = ReversalService::reverse(&ReversalSource {
            journal_id: id,
            ref_no: Some("5"),
            code: None,
            description: None,
            lines: &lines,
        });

        let before = JournalTotals::from_lines(&lines).unwrap();
        let after = JournalTotals::from_lines(&reversed.lines).unwrap();
        prop_assert_eq!(before.total_debit, after.total_credit);
        prop_assert_eq!(before.total_credit, after.total_debit);
        prop_assert_eq!(reversed.lines.len(), lines.len());
    }

    #[test]
    fn prop_original_plus_reversal_nets_to_zero(lines in arb_lines(), id in arb_uuid()) {
        let reversed = ReversalService::reverse(&ReversalSource {
            journal_id: id,
            ref_no: None,
            code: None,
            description: None,
            lines: &lines,
        });

        for (original, reversal) in lines.iter().zip(&reversed.lines) {
            prop_assert_eq!(original.code_id, reversal.code_id);
            prop_assert_eq!(original.detail_id, reversal.detail_id);
            prop_assert_eq!(
                (original.debit - original.credit) + (reversal.debit - reversal.credit),
                Decimal::ZERO
            );
        }
    }
}
