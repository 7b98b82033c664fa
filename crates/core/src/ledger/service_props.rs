//! Property-based tests for JournalService.
//!
//! - Saving never fails on balance; it picks draft or temporary
//! - Posting succeeds exactly when the saved status would be temporary
//! - Auto journals always balance

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::service::JournalService;
use super::types::{AutoJournalInput, JournalLine, JournalStatus, JournalTotals};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Lines whose debits equal their credits.
fn balanced_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec((arb_uuid(), arb_uuid(), positive_amount()), 1..6).prop_map(|pairs| {
        pairs
            .into_iter()
            .flat_map(|(debit_code, credit_code, amount)| {
                [
                    JournalLine::debit(debit_code, None, amount),
                    JournalLine::credit(credit_code, None, amount),
                ]
            })
            .collect()
    })
}

/// Arbitrary non-negative lines, balanced or not.
fn any_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec(
        (arb_uuid(), positive_amount(), any::<bool>()),
        1..8,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(code, amount, is_debit)| {
                if is_debit {
                    JournalLine::debit(code, None, amount)
                } else {
                    JournalLine::credit(code, None, amount)
                }
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_balanced_lines_save_as_temporary(lines in balanced_lines()) {
        prop_assert!(JournalService::validate_lines(&lines, |_| true).is_ok());
        prop_assert_eq!(
            JournalService::status_on_save(&lines, false),
            Ok(JournalStatus::Temporary)
        );
    }

    #[test]
    fn prop_save_never_fails_on_balance(lines in any_lines()) {
        prop_assert!(JournalService::validate_lines(&lines, |_| true).is_ok());
        let status = JournalService::status_on_save(&lines, false).unwrap();
        prop_assert!(status != JournalStatus::Permanent);
    }

    #[test]
    fn prop_post_agrees_with_save_status(lines in any_lines()) {
        let saved = JournalService::status_on_save(&lines, false).unwrap();
        let posted = JournalService::validate_post(saved, &lines);
        match saved {
            JournalStatus::Temporary => prop_assert!(posted.is_ok()),
            _ => {
                let is_unbalanced = matches!(posted, Err(LedgerError::Unbalanced { .. }));
                prop_assert!(is_unbalanced);
            }
        }
    }

    #[test]
    fn prop_permanent_cannot_be_posted_again(lines in balanced_lines()) {
        prop_assert_eq!(
            JournalService::validate_post(JournalStatus::Permanent, &lines),
            Err(LedgerError::CannotModifyPosted)
        );
    }

    #[test]
    fn prop_auto_journal_balances(
        debit_code in arb_uuid(),
        credit_code in arb_uuid(),
        amount in positive_amount(),
    ) {
        let input = AutoJournalInput {
            debit_code_id: debit_code,
            debit_detail_id: None,
            credit_code_id: credit_code,
            credit_detail_id: None,
            amount,
            description: None,
        };
        let lines = JournalService::auto_lines(&input).unwrap();
        let totals = JournalTotals::from_lines(&lines).unwrap();
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.total_debit, amount);
    }
}
