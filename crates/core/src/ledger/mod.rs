//! Double-entry journals.
//!
//! This module implements the journal rules used by every posting path:
//! - Domain types and the balance tolerance
//! - Save-time status selection and post-time balance checks
//! - Reversal of posted journals
//! - Sequence numbering helpers
//! - The typed journal filter used by listing and bulk posting

pub mod error;
pub mod filter;
pub mod reversal;
pub mod sequence;
pub mod service;
pub mod types;

#[cfg(test)]
mod reversal_props;
#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use filter::{CompiledFilter, JournalFilter, escape_like};
pub use reversal::{ReversalService, ReversalSource, ReversedJournal};
pub use sequence::{SEQUENCE_PATTERN, SequenceScope, is_sequence_value, next_sequence_value};
pub use service::JournalService;
pub use types::{
    AutoJournalInput, BALANCE_TOLERANCE, JournalLine, JournalStatus, JournalTotals, MAX_AMOUNT,
};
