//! Errors raised by chart-of-accounts rules.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while maintaining codes, details and detail levels.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxonomyError {
    // ========== Validation Errors ==========
    /// Code kind is not one of group/general/specific.
    #[error("Invalid code kind: {0}")]
    InvalidKind(String),

    /// A required text field is empty.
    #[error("Field must not be empty: {0}")]
    RequiredField(&'static str),

    /// Group codes must be exactly two digits.
    #[error("Group code must be exactly two digits: {0}")]
    InvalidGroupCode(String),

    /// Parent is missing, unexpected or of the wrong kind.
    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    /// Detail codes must be exactly four digits.
    #[error("Detail code must be exactly four digits: {0}")]
    InvalidDetailCode(String),

    /// Only leaf detail levels can be linked to a detail.
    #[error("Detail level {0} has children and cannot be linked")]
    LinkMustBeLeaf(Uuid),

    // ========== Conflict Errors ==========
    /// Code string is already taken.
    #[error("Code already exists: {0}")]
    DuplicateCode(String),

    /// Node still has children.
    #[error("Cannot delete {0}: it has children")]
    HasChildren(Uuid),

    /// Code is referenced by journal items.
    #[error("Code {0} is referenced by journal items")]
    CodeInUse(Uuid),

    /// Detail is referenced by journal items or treasury resources.
    #[error("Detail {0} is in use")]
    DetailInUse(Uuid),

    /// Detail level is linked to details.
    #[error("Detail level {0} is linked to details")]
    LevelInUse(Uuid),

    /// System-managed details cannot be changed through the user API.
    #[error("Detail {0} is system managed")]
    SystemManaged(Uuid),

    /// All four-digit detail codes are taken.
    #[error("No free detail code left")]
    DetailCodeSpaceExhausted,

    // ========== Not Found ==========
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Requested id.
        id: Uuid,
    },
}

impl TaxonomyError {
    /// Returns the message key for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidKind(_) => "invalidKind",
            Self::RequiredField(_) => "requiredField",
            Self::InvalidGroupCode(_) => "invalidGroupCode",
            Self::InvalidParent(_) => "invalidParent",
            Self::InvalidDetailCode(_) => "invalidDetailCode",
            Self::LinkMustBeLeaf(_) => "linkMustBeLeaf",
            Self::DuplicateCode(_) => "duplicateCode",
            Self::HasChildren(_) => "hasChildren",
            Self::CodeInUse(_) => "codeInUse",
            Self::DetailInUse(_) => "detailInUse",
            Self::LevelInUse(_) => "levelInUse",
            Self::SystemManaged(_) => "systemManaged",
            Self::DetailCodeSpaceExhausted => "detailCodeSpaceExhausted",
            Self::NotFound { .. } => "notFound",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidKind(_)
            | Self::RequiredField(_)
            | Self::InvalidGroupCode(_)
            | Self::InvalidParent(_)
            | Self::InvalidDetailCode(_)
            | Self::LinkMustBeLeaf(_) => 400,

            Self::NotFound { .. } => 404,

            Self::DuplicateCode(_)
            | Self::HasChildren(_)
            | Self::CodeInUse(_)
            | Self::DetailInUse(_)
            | Self::LevelInUse(_)
            | Self::SystemManaged(_)
            | Self::DetailCodeSpaceExhausted => 409,
        }
    }
}
