//! Repository error type.
//!
//! Mutations cross domain boundaries (posting a receipt touches fiscal
//! years, journals and checks), so every repository returns the same error:
//! a domain error from `daftar-core` or a database error.

use daftar_core::{
    fiscal::FiscalError, ledger::LedgerError, taxonomy::TaxonomyError, treasury::TreasuryError,
};
use daftar_shared::AppError;
use sea_orm::{DbErr, SqlErr};

/// Errors returned by repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Chart-of-accounts rule violated.
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),

    /// Fiscal year rule violated.
    #[error(transparent)]
    Fiscal(#[from] FiscalError),

    /// Journal rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Treasury rule violated.
    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    /// Returns the message key for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Taxonomy(e) => e.error_code(),
            Self::Fiscal(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Treasury(e) => e.error_code(),
            Self::Database(_) => "internalError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Taxonomy(e) => e.http_status_code(),
            Self::Fiscal(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
            Self::Treasury(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Database(e) => Self::Database(e.to_string()),
            other => Self::from_status(other.http_status_code(), other.error_code(), other.to_string()),
        }
    }
}

/// Maps a unique violation on `constraint` to `conflict`; any other error
/// stays a database error.
pub(crate) fn on_unique<E>(err: DbErr, constraint: &str, conflict: impl FnOnce() -> E) -> RepoError
where
    E: Into<RepoError>,
{
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains(constraint) => {
            conflict().into()
        }
        _ => RepoError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daftar_core::treasury::MappingKey;
    use uuid::Uuid;

    #[test]
    fn test_domain_errors_keep_status_and_key() {
        let err: RepoError = LedgerError::CannotModifyPosted.into();
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "cannotModifyPosted");

        let app: AppError = err.into();
        assert_eq!(app.status_code(), 409);
        assert_eq!(app.message_key(), "cannotModifyPosted");
    }

    #[test]
    fn test_missing_mapping_is_configuration_error() {
        let app: AppError = RepoError::from(TreasuryError::MissingMapping(MappingKey::ReceiptCash)).into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.error_code(), "CONFIGURATION_ERROR");
        assert_eq!(app.message_key(), "missingMapping");
    }

    #[test]
    fn test_database_error_is_internal() {
        let app: AppError = RepoError::from(DbErr::Custom("boom".into())).into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.message_key(), "internalError");
    }

    #[test]
    fn test_on_unique_passes_other_errors_through() {
        let err = on_unique(DbErr::Custom("boom".into()), "uq_codes_code", || {
            TaxonomyError::DuplicateCode("11".into())
        });
        assert!(matches!(err, RepoError::Database(_)));

        let err: RepoError = TaxonomyError::NotFound {
            entity: "code",
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(err.http_status_code(), 404);
    }
}
