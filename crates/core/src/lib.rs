//! Core business logic for Daftar.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `taxonomy` - Chart of accounts: codes, details and detail levels
//! - `fiscal` - Fiscal year management
//! - `ledger` - Double-entry journals
//! - `treasury` - Receipts, payments, checks and the ledger bridge

pub mod fiscal;
pub mod ledger;
pub mod taxonomy;
pub mod treasury;
