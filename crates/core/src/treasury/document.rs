//! Receipt/payment document validation.

use rust_decimal::Decimal;

use crate::ledger::MAX_AMOUNT;

use super::error::TreasuryError;
use super::instrument::InstrumentType;

/// Validates a document's items against its header.
///
/// - At least one item
/// - Every amount and the total are positive and below [`MAX_AMOUNT`]
/// - The item amounts sum exactly to the total
/// - Cash or check items require a cashbox
pub fn validate_document<I>(total: Decimal, items: I, has_cashbox: bool) -> Result<(), TreasuryError>
where
    I: IntoIterator<Item = (InstrumentType, Decimal)>,
{
    let mut count = 0usize;
    let mut sum = Decimal::ZERO;
    let mut needs_cashbox = false;

    for (kind, amount) in items {
        if !in_range(amount) {
            return Err(TreasuryError::InvalidAmount);
        }
        count += 1;
        sum = sum.checked_add(amount).ok_or(TreasuryError::InvalidAmount)?;
        needs_cashbox |= kind.requires_cashbox();
    }

    if count == 0 {
        return Err(TreasuryError::ItemsRequired);
    }
    if !in_range(total) {
        return Err(TreasuryError::InvalidAmount);
    }
    if sum != total {
        return Err(TreasuryError::TotalMismatch { total, sum });
    }
    if needs_cashbox && !has_cashbox {
        return Err(TreasuryError::CashboxRequired);
    }

    Ok(())
}

fn in_range(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount < MAX_AMOUNT
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_document() {
        let items = [
            (InstrumentType::Transfer, dec!(60)),
            (InstrumentType::Card, dec!(40)),
        ];
        assert!(validate_document(dec!(100), items, false).is_ok());
    }

    #[test]
    fn test_cash_and_check_without_cashbox() {
        let items = [
            (InstrumentType::Cash, dec!(50)),
            (InstrumentType::Check, dec!(50)),
        ];
        assert_eq!(
            validate_document(dec!(100), items, false),
            Err(TreasuryError::CashboxRequired)
        );
        assert!(validate_document(dec!(100), items, true).is_ok());
    }

    #[test]
    fn test_total_mismatch() {
        let items = [(InstrumentType::Card, dec!(99.99))];
        assert_eq!(
            validate_document(dec!(100), items, false),
            Err(TreasuryError::TotalMismatch {
                total: dec!(100),
                sum: dec!(99.99)
            })
        );
    }

    #[test]
    fn test_empty_and_non_positive() {
        assert_eq!(
            validate_document(dec!(1), std::iter::empty::<(InstrumentType, Decimal)>(), true),
            Err(TreasuryError::ItemsRequired)
        );
        assert_eq!(
            validate_document(dec!(0), [(InstrumentType::Cash, dec!(0))], true),
            Err(TreasuryError::InvalidAmount)
        );
    }

    #[test]
    fn test_amount_beyond_column_range() {
        assert_eq!(
            validate_document(MAX_AMOUNT, [(InstrumentType::Card, MAX_AMOUNT)], false),
            Err(TreasuryError::InvalidAmount)
        );
    }

    #[test]
    fn test_huge_items_do_not_panic() {
        let half = Decimal::MAX / dec!(2) + Decimal::ONE;
        let items = [(InstrumentType::Card, half), (InstrumentType::Card, half)];
        assert_eq!(
            validate_document(half, items, false),
            Err(TreasuryError::InvalidAmount)
        );
    }
}
