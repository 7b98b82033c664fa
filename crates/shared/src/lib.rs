//! Shared types, errors, and configuration for Daftar.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error type rendered by the API
//! - Configuration management
//! - JWT validation used as the authentication guard

pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::{AppConfig, Environment, TreasuryConfig};
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
