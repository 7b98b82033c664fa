//! Journal service: line validation and lifecycle transitions.
//!
//! This module provides the core business logic for validating journals
//! before they are persisted. It has no database dependencies; lookups are
//! injected as closures by the repository layer.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{AutoJournalInput, JournalLine, JournalStatus, JournalTotals, MAX_AMOUNT};

/// Stateless journal rules.
pub struct JournalService;

impl JournalService {
    /// Validates the lines of a journal about to be saved.
    ///
    /// 1. At least one line
    /// 2. Debit and credit are non-negative and below [`MAX_AMOUNT`]
    /// 3. Every referenced code exists (`code_exists`)
    ///
    /// Balance is deliberately not checked here; see [`Self::status_on_save`].
    pub fn validate_lines<F>(lines: &[JournalLine], code_exists: F) -> Result<(), LedgerError>
    where
        F: Fn(Uuid) -> bool,
    {
        if lines.is_empty() {
            return Err(LedgerError::ItemsRequired);
        }

        for line in lines {
            if !in_range(line.debit) || !in_range(line.credit) {
                return Err(LedgerError::InvalidAmount);
            }
            if !code_exists(line.code_id) {
                return Err(LedgerError::InvalidCode(line.code_id));
            }
        }

        Ok(())
    }

    /// Status a journal gets on create/update: `draft` when unbalanced or
    /// forced, `temporary` otherwise.
    pub fn status_on_save(
        lines: &[JournalLine],
        force_draft: bool,
    ) -> Result<JournalStatus, LedgerError> {
        let totals = JournalTotals::from_lines(lines)?;
        if force_draft || !totals.is_balanced {
            Ok(JournalStatus::Draft)
        } else {
            Ok(JournalStatus::Temporary)
        }
    }

    /// Rejects any change to a permanent journal.
    pub fn validate_can_modify(status: JournalStatus) -> Result<(), LedgerError> {
        if status.is_editable() {
            Ok(())
        } else {
            Err(LedgerError::CannotModifyPosted)
        }
    }

    /// Validates posting: not yet permanent, has lines and balances.
    ///
    /// Totals are re-summed from the stored lines, never taken from the client.
    pub fn validate_post(
        status: JournalStatus,
        lines: &[JournalLine],
    ) -> Result<JournalTotals, LedgerError> {
        Self::validate_can_modify(status)?;
        if lines.is_empty() {
            return Err(LedgerError::ItemsRequired);
        }

        let totals = JournalTotals::from_lines(lines)?;
        if !totals.is_balanced {
            return Err(LedgerError::Unbalanced {
                debit: totals.total_debit,
                credit: totals.total_credit,
            });
        }
        Ok(totals)
    }

    /// Only permanent journals can be reversed.
    pub fn validate_can_reverse(status: JournalStatus) -> Result<(), LedgerError> {
        if status == JournalStatus::Permanent {
            Ok(())
        } else {
            Err(LedgerError::CanOnlyReversePosted)
        }
    }

    /// Builds the two lines of an auto journal: one debit and one credit of
    /// the same positive amount.
    pub fn auto_lines(input: &AutoJournalInput) -> Result<Vec<JournalLine>, LedgerError> {
        if input.amount <= Decimal::ZERO || input.amount >= MAX_AMOUNT {
            return Err(LedgerError::InvalidAmount);
        }

        let mut debit = JournalLine::debit(input.debit_code_id, input.debit_detail_id, input.amount);
        let mut credit =
            JournalLine::credit(input.credit_code_id, input.credit_detail_id, input.amount);
        debit.description.clone_from(&input.description);
        credit.description.clone_from(&input.description);

        Ok(vec![debit, credit])
    }
}

fn in_range(amount: Decimal) -> bool {
    !amount.is_sign_negative() && amount < MAX_AMOUNT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn balanced(amount: Decimal) -> Vec<JournalLine> {
        vec![
            JournalLine::debit(Uuid::new_v4(), None, amount),
            JournalLine::credit(Uuid::new_v4(), None, amount),
        ]
    }

    #[test]
    fn test_balanced_save_is_temporary() {
        assert_eq!(
            JournalService::status_on_save(&balanced(dec!(100)), false).unwrap(),
            JournalStatus::Temporary
        );
    }

    #[test]
    fn test_force_draft() {
        assert_eq!(
            JournalService::status_on_save(&balanced(dec!(100)), true).unwrap(),
            JournalStatus::Draft
        );
    }

    #[test]
    fn test_unbalanced_save_is_draft_not_error() {
        let lines = vec![
            JournalLine::debit(Uuid::new_v4(), None, dec!(100)),
            JournalLine::credit(Uuid::new_v4(), None, dec!(90)),
        ];
        assert!(JournalService::validate_lines(&lines, |_| true).is_ok());
        assert_eq!(
            JournalService::status_on_save(&lines, false).unwrap(),
            JournalStatus::Draft
        );
    }

    #[test]
    fn test_validate_lines_rejects_empty() {
        assert_eq!(
            JournalService::validate_lines(&[], |_| true),
            Err(LedgerError::ItemsRequired)
        );
    }

    #[test]
    fn test_validate_lines_rejects_negative() {
        let lines = vec![JournalLine::debit(Uuid::new_v4(), None, dec!(-1))];
        assert_eq!(
            JournalService::validate_lines(&lines, |_| true),
            Err(LedgerError::InvalidAmount)
        );
    }

    #[test]
    fn test_validate_lines_rejects_amount_beyond_column_range() {
        let lines = balanced(MAX_AMOUNT);
        assert_eq!(
            JournalService::validate_lines(&lines, |_| true),
            Err(LedgerError::InvalidAmount)
        );
        let largest = MAX_AMOUNT - Decimal::ONE;
        assert!(JournalService::validate_lines(&balanced(largest), |_| true).is_ok());
    }

    #[test]
    fn test_huge_amounts_do_not_panic_on_save() {
        let half = Decimal::MAX / dec!(2) + Decimal::ONE;
        let lines = vec![
            JournalLine::debit(Uuid::new_v4(), None, half),
            JournalLine::debit(Uuid::new_v4(), None, half),
        ];
        assert_eq!(
            JournalService::status_on_save(&lines, false),
            Err(LedgerError::InvalidAmount)
        );
        assert_eq!(
            JournalService::validate_post(JournalStatus::Temporary, &lines),
            Err(LedgerError::InvalidAmount)
        );
    }

    #[test]
    fn test_validate_lines_rejects_unknown_code() {
        let lines = balanced(dec!(10));
        let missing = lines[1].code_id;
        assert_eq!(
            JournalService::validate_lines(&lines, |id| id != missing),
            Err(LedgerError::InvalidCode(missing))
        );
    }

    #[test]
    fn test_post_unbalanced_rejected() {
        let lines = vec![
            JournalLine::debit(Uuid::new_v4(), None, dec!(100)),
            JournalLine::credit(Uuid::new_v4(), None, dec!(90)),
        ];
        assert_eq!(
            JournalService::validate_post(JournalStatus::Draft, &lines),
            Err(LedgerError::Unbalanced {
                debit: dec!(100),
                credit: dec!(90)
            })
        );
    }

    #[test]
    fn test_post_permanent_rejected() {
        assert_eq!(
            JournalService::validate_post(JournalStatus::Permanent, &balanced(dec!(5))),
            Err(LedgerError::CannotModifyPosted)
        );
    }

    #[test]
    fn test_post_balanced_draft_allowed() {
        let totals =
            JournalService::validate_post(JournalStatus::Draft, &balanced(dec!(5))).unwrap();
        assert_eq!(totals.total_debit, dec!(5));
    }

    #[test]
    fn test_reverse_requires_permanent() {
        assert!(JournalService::validate_can_reverse(JournalStatus::Permanent).is_ok());
        assert_eq!(
            JournalService::validate_can_reverse(JournalStatus::Temporary),
            Err(LedgerError::CanOnlyReversePosted)
        );
    }

    #[test]
    fn test_auto_lines() {
        let input = AutoJournalInput {
            debit_code_id: Uuid::new_v4(),
            debit_detail_id: None,
            credit_code_id: Uuid::new_v4(),
            credit_detail_id: Some(Uuid::new_v4()),
            amount: dec!(250),
            description: Some("Owner contribution".into()),
        };
        let lines = JournalService::auto_lines(&input).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].debit, dec!(250));
        assert_eq!(lines[1].credit, dec!(250));
        assert_eq!(lines[1].detail_id, input.credit_detail_id);
        assert_eq!(
            JournalService::status_on_save(&lines, false).unwrap(),
            JournalStatus::Temporary
        );
    }

    #[test]
    fn test_auto_lines_rejects_zero() {
        let input = AutoJournalInput {
            debit_code_id: Uuid::new_v4(),
            debit_detail_id: None,
            credit_code_id: Uuid::new_v4(),
            credit_detail_id: None,
            amount: Decimal::ZERO,
            description: None,
        };
        assert_eq!(
            JournalService::auto_lines(&input),
            Err(LedgerError::InvalidAmount)
        );
    }
}
