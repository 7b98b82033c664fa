//! `SeaORM` entities, one module per table.

#![allow(missing_docs)]

pub mod bank_accounts;
pub mod card_readers;
pub mod cashboxes;
pub mod checkbooks;
pub mod checks;
pub mod codes;
pub mod detail_levels;
pub mod details;
pub mod details_detail_levels;
pub mod fiscal_years;
pub mod instrument_links;
pub mod invoices;
pub mod journal_items;
pub mod journals;
pub mod payment_items;
pub mod payments;
pub mod receipt_items;
pub mod receipts;
pub mod sea_orm_active_enums;
pub mod settings;
