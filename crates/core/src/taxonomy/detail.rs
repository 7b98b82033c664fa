//! Detail (subsidiary) accounts: a flat, globally unique 4-digit code space.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::TaxonomyError;

/// Highest assignable detail code.
pub const MAX_DETAIL_CODE: u32 = 9999;

/// Who owns a detail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    /// Created and maintained by operators.
    UserManaged,
    /// Handler row auto-created for a cashbox, bank account or card reader.
    SystemManaged,
}

impl DetailKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserManaged => "user_managed",
            Self::SystemManaged => "system_managed",
        }
    }
}

/// Validates a detail code: exactly four ASCII digits.
pub fn validate_detail_code(code: &str) -> Result<(), TaxonomyError> {
    if code.len() == 4 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(TaxonomyError::InvalidDetailCode(code.to_string()))
    }
}

/// Suggests the next detail code after the current numeric maximum.
///
/// Codes start at `0001`; past `9999` the space is exhausted.
pub fn next_detail_code(current_max: Option<u32>) -> Result<String, TaxonomyError> {
    let next = current_max.map_or(1, |max| max + 1);
    if next > MAX_DETAIL_CODE {
        return Err(TaxonomyError::DetailCodeSpaceExhausted);
    }
    Ok(format!("{next:04}"))
}

/// Rejects user edits of system-managed rows.
pub fn ensure_user_managed(id: Uuid, kind: DetailKind) -> Result<(), TaxonomyError> {
    match kind {
        DetailKind::UserManaged => Ok(()),
        DetailKind::SystemManaged => Err(TaxonomyError::SystemManaged(id)),
    }
}
