//! Application-wide error types.
//!
//! Every domain error is flattened into an [`AppError`] before it leaves the
//! API. The `key` carried by most variants is the i18n message key shown to
//! clients (for example `duplicateCode`), while the `detail` string is the
//! developer-facing description that is only exposed outside production.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {detail}")]
    NotFound {
        /// Message key.
        key: &'static str,
        /// Developer-facing detail.
        detail: String,
    },

    /// Validation error.
    #[error("Validation error: {detail}")]
    Validation {
        /// Message key.
        key: &'static str,
        /// Developer-facing detail.
        detail: String,
    },

    /// Conflict with current state (duplicate entry, posted journal, ...).
    #[error("Conflict: {detail}")]
    Conflict {
        /// Message key.
        key: &'static str,
        /// Developer-facing detail.
        detail: String,
    },

    /// Server-side configuration is incomplete (e.g. missing account mapping).
    #[error("Configuration error: {detail}")]
    Configuration {
        /// Message key.
        key: &'static str,
        /// Developer-facing detail.
        detail: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an error from a domain error's status code, key and message.
    ///
    /// Unknown status codes collapse into [`AppError::Internal`].
    #[must_use]
    pub fn from_status(status: u16, key: &'static str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            400 => Self::Validation { key, detail },
            401 => Self::Unauthorized(detail),
            404 => Self::NotFound { key, detail },
            409 => Self::Conflict { key, detail },
            _ if key == "missingMapping" => Self::Configuration { key, detail },
            _ => Self::Internal(detail),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound { .. } => 404,
            Self::Validation { .. } => 400,
            Self::Conflict { .. } => 409,
            Self::Configuration { .. } | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict { .. } => "CONFLICT",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the i18n message key for this error.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound { key, .. }
            | Self::Validation { key, .. }
            | Self::Conflict { key, .. }
            | Self::Configuration { key, .. } => key,
            Self::Database(_) | Self::Internal(_) => "internalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(400, 400, "VALIDATION_ERROR")]
    #[case(401, 401, "UNAUTHORIZED")]
    #[case(404, 404, "NOT_FOUND")]
    #[case(409, 409, "CONFLICT")]
    #[case(500, 500, "INTERNAL_ERROR")]
    #[case(418, 500, "INTERNAL_ERROR")]
    fn test_from_status(#[case] input: u16, #[case] status: u16, #[case] code: &str) {
        let err = AppError::from_status(input, "someKey", "detail");
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_missing_mapping_is_configuration_error() {
        let err = AppError::from_status(500, "missingMapping", "RECEIPT_CASH_CODE_ID");
        assert!(matches!(err, AppError::Configuration { .. }));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message_key(), "missingMapping");
    }

    #[test]
    fn test_message_keys() {
        assert_eq!(
            AppError::Conflict {
                key: "duplicateCode",
                detail: String::new()
            }
            .message_key(),
            "duplicateCode"
        );
        assert_eq!(AppError::Unauthorized(String::new()).message_key(), "unauthorized");
        assert_eq!(AppError::Database(String::new()).message_key(), "internalError");
        assert_eq!(AppError::Internal(String::new()).message_key(), "internalError");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthorized("msg".into()).to_string(),
            "Authentication failed: msg"
        );
        assert_eq!(
            AppError::Validation {
                key: "k",
                detail: "msg".into()
            }
            .to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
    }
}
