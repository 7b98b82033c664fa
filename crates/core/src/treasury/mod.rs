//! Treasury: receipts, payments and the instruments that settle them.
//!
//! - Instrument types and the `InstrumentRef` sum type
//! - Document total and cashbox validation
//! - Check and checkbook state rules
//! - The bridge that turns a document into balanced journal lines

pub mod check;
pub mod document;
pub mod error;
pub mod instrument;
pub mod posting;

#[cfg(test)]
mod posting_props;

pub use check::{CheckService, CheckStatus, CheckType, CheckbookSpan, CheckbookStatus};
pub use document::validate_document;
pub use error::TreasuryError;
pub use instrument::{InstrumentRef, InstrumentType};
pub use posting::{DocumentDirection, MappingKey, PostingDocument, PostingItem, PostingService};
