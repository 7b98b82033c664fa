//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every multi-statement mutation runs in one transaction that rolls back
//! when dropped uncommitted.

pub mod check;
pub mod code;
pub mod detail;
pub mod detail_level;
pub mod document;
pub mod error;
pub mod fiscal;
pub mod instrument_link;
pub mod journal;
pub mod mapping;
pub mod sequence;
pub mod treasury_resource;

pub use check::{CheckFilter, CheckInput, CheckRepository, CheckbookInput};
pub use code::{CodeFilter, CodeRepository};
pub use detail::{DetailFilter, DetailInput, DetailRepository, LinkInput};
pub use detail_level::{DetailLevelInput, DetailLevelRepository};
pub use document::{
    Document, DocumentFilter, DocumentHeader, DocumentInput, DocumentItem, DocumentItemInput,
    DocumentRepository,
};
pub use error::{RepoError, RepoResult};
pub use fiscal::{CreateFiscalYearInput, FiscalYearRepository, UpdateFiscalYearInput};
pub use journal::{AutoJournalRequest, JournalInput, JournalRepository, JournalWithItems};
pub use mapping::MappingResolver;
pub use treasury_resource::{
    BankAccountInput, CardReaderInput, CashboxInput, TreasuryResourceRepository,
};
