//! Reversal of posted journals.
//!
//! A permanent journal is never edited. It is countered by a new permanent
//! journal whose lines swap debit and credit.

use uuid::Uuid;

use super::types::{JournalLine, JournalStatus};

/// Prefix applied to reversal descriptions.
pub const REVERSAL_DESCRIPTION_PREFIX: &str = "Reversal: ";

/// Prefix applied to reversal reference numbers.
pub const REVERSAL_REF_PREFIX: &str = "REV-";

/// The journal being reversed.
#[derive(Debug, Clone)]
pub struct ReversalSource<'a> {
    /// Original journal id.
    pub journal_id: Uuid,
    /// Original reference number.
    pub ref_no: Option<&'a str>,
    /// Original journal code.
    pub code: Option<&'a str>,
    /// Original description.
    pub description: Option<&'a str>,
    /// Original lines, in position order.
    pub lines: &'a [JournalLine],
}

/// Header and lines of the reversing journal.
#[derive(Debug, Clone)]
pub struct ReversedJournal {
    /// `REV-` + original ref (or code, or id).
    pub ref_no: String,
    /// Prefixed description.
    pub description: String,
    /// Always permanent.
    pub status: JournalStatus,
    /// Lines with debit and credit swapped, same order.
    pub lines: Vec<JournalLine>,
}

/// Stateless service for creating reversing journals.
pub struct ReversalService;

impl ReversalService {
    /// Create the reversing journal by swapping debits and credits.
    ///
    /// For each original line:
    /// - Debit becomes credit and credit becomes debit
    /// - Code, detail and party are preserved
    /// - Description is prefixed with "Reversal: "
    #[must_use]
    pub fn reverse(source: &ReversalSource<'_>) -> ReversedJournal {
        let lines = source
            .lines
            .iter()
            .map(|line| JournalLine {
                code_id: line.code_id,
                detail_id: line.detail_id,
                party_id: line.party_id,
                debit: line.credit,
                credit: line.debit,
                description: line
                    .description
                    .as_ref()
                    .map(|d| format!("{REVERSAL_DESCRIPTION_PREFIX}{d}")),
            })
            .collect();

        let reference = source
            .ref_no
            .or(source.code)
            .map_or_else(|| source.journal_id.to_string(), str::to_string);

        let description = match source.description {
            Some(d) if !d.is_empty() => format!("{REVERSAL_DESCRIPTION_PREFIX}{d}"),
            _ => format!("{REVERSAL_DESCRIPTION_PREFIX}{reference}"),
        };

        ReversedJournal {
            ref_no: format!("{REVERSAL_REF_PREFIX}{reference}"),
            description,
            status: JournalStatus::Permanent,
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn lines() -> Vec<JournalLine> {
        vec![
            JournalLine::debit(Uuid::new_v4(), Some(Uuid::new_v4()), dec!(100))
                .with_description("Cash in"),
            JournalLine::credit(Uuid::new_v4(), None, dec!(100)),
        ]
    }

    #[test]
    fn test_swaps_and_prefixes() {
        let original = lines();
        let source = ReversalSource {
            journal_id: Uuid::new_v4(),
            ref_no: Some("17"),
            code: Some("12"),
            description: Some("Opening"),
            lines: &original,
        };

        let reversed = ReversalService::reverse(&source);

        assert_eq!(reversed.ref_no, "REV-17");
        assert_eq!(reversed.description, "Reversal: Opening");
        assert_eq!(reversed.status, JournalStatus::Permanent);
        assert_eq!(reversed.lines[0].credit, dec!(100));
        assert_eq!(reversed.lines[0].debit, Decimal::ZERO);
        assert_eq!(reversed.lines[0].detail_id, original[0].detail_id);
        assert_eq!(
            reversed.lines[0].description.as_deref(),
            Some("Reversal: Cash in")
        );
        assert_eq!(reversed.lines[1].debit, dec!(100));
        assert_eq!(reversed.lines[1].description, None);
    }

    #[test]
    fn test_reference_falls_back_to_code_then_id() {
        let original = lines();
        let id = Uuid::new_v4();
        let by_code = ReversalService::reverse(&ReversalSource {
            journal_id: id,
            ref_no: None,
            code: Some("44"),
            description: None,
            lines: &original,
        });
        assert_eq!(by_code.ref_no, "REV-44");
        assert_eq!(by_code.description, "Reversal: 44");

        let by_id = ReversalService::reverse(&ReversalSource {
            journal_id: id,
            ref_no: None,
            code: None,
            description: Some(""),
            lines: &original,
        });
        assert_eq!(by_id.ref_no, format!("REV-{id}"));
    }
}
