//! Three-level account codes: group → general → specific.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::TaxonomyError;

/// Level of an account code in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    /// Top level, two-digit code, no parent.
    Group,
    /// Child of a group.
    General,
    /// Child of a general code; the level journal lines post to.
    Specific,
}

impl CodeKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::General => "general",
            Self::Specific => "specific",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "group" => Some(Self::Group),
            "general" => Some(Self::General),
            "specific" => Some(Self::Specific),
            _ => None,
        }
    }

    /// The kind a parent must have, or `None` when the code must be a root.
    #[must_use]
    pub fn required_parent_kind(&self) -> Option<Self> {
        match self {
            Self::Group => None,
            Self::General => Some(Self::Group),
            Self::Specific => Some(Self::General),
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normal balance side of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    /// Debit-normal.
    Debit,
    /// Credit-normal.
    Credit,
}

impl Nature {
    /// Returns the string representation of the nature.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a nature. Anything unrecognised degrades to `None` instead of failing.
    pub fn parse_lenient(s: Option<&str>) -> Option<Self> {
        match s.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("debit") => Some(Self::Debit),
            Some("credit") => Some(Self::Credit),
            _ => None,
        }
    }
}

/// Raw code payload as received from a client (or merged for an update).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodePayload {
    /// Code string.
    pub code: String,
    /// Display title.
    pub title: String,
    /// Kind as text.
    pub kind: String,
    /// Parent code id.
    pub parent_id: Option<Uuid>,
    /// Nature as text.
    pub nature: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Whether detail accounts may be attached on journal lines.
    pub can_have_details: Option<bool>,
}

/// A code payload that passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCode {
    /// Trimmed code string.
    pub code: String,
    /// Trimmed title.
    pub title: String,
    /// Parsed kind.
    pub kind: CodeKind,
    /// Parent id.
    pub parent_id: Option<Uuid>,
    /// Parsed nature, `None` when absent or unrecognised.
    pub nature: Option<Nature>,
    /// Active flag.
    pub is_active: bool,
    /// Detail flag.
    pub can_have_details: bool,
}

/// Minimal parent information needed for kind validation.
#[derive(Debug, Clone, Copy)]
pub struct ParentInfo {
    /// Parent id.
    pub id: Uuid,
    /// Parent kind.
    pub kind: CodeKind,
}

/// Stateless rules for account codes.
pub struct CodeService;

impl CodeService {
    /// Validates the structure of a payload: kind, non-empty fields and the
    /// two-digit group rule.
    pub fn validate_payload(payload: &CodePayload) -> Result<ValidatedCode, TaxonomyError> {
        let kind = CodeKind::parse(&payload.kind)
            .ok_or_else(|| TaxonomyError::InvalidKind(payload.kind.clone()))?;

        let code = payload.code.trim();
        if code.is_empty() {
            return Err(TaxonomyError::RequiredField("code"));
        }
        let title = payload.title.trim();
        if title.is_empty() {
            return Err(TaxonomyError::RequiredField("title"));
        }

        if kind == CodeKind::Group && !is_group_code(code) {
            return Err(TaxonomyError::InvalidGroupCode(code.to_string()));
        }

        Ok(ValidatedCode {
            code: code.to_string(),
            title: title.to_string(),
            kind,
            parent_id: payload.parent_id,
            nature: Nature::parse_lenient(payload.nature.as_deref()),
            is_active: payload.is_active.unwrap_or(true),
            can_have_details: payload.can_have_details.unwrap_or(false),
        })
    }

    /// Checks the parent against the kind of the code being saved.
    ///
    /// `parent` is the loaded parent row, or `None` when `parent_id` is unset
    /// or points at nothing.
    pub fn validate_parent(
        code: &ValidatedCode,
        parent: Option<ParentInfo>,
    ) -> Result<(), TaxonomyError> {
        match (code.kind.required_parent_kind(), code.parent_id, parent) {
            (None, None, _) => Ok(()),
            (None, Some(_), _) => Err(TaxonomyError::InvalidParent(
                "group codes cannot have a parent".to_string(),
            )),
            (Some(required), None, _) => Err(TaxonomyError::InvalidParent(format!(
                "{} codes require a {required} parent",
                code.kind
            ))),
            (Some(_), Some(id), None) => {
                Err(TaxonomyError::InvalidParent(format!("parent {id} does not exist")))
            }
            (Some(required), Some(_), Some(info)) if info.kind != required => {
                Err(TaxonomyError::InvalidParent(format!(
                    "{} codes require a {required} parent, got {}",
                    code.kind, info.kind
                )))
            }
            _ => Ok(()),
        }
    }

    /// Rejects a kind change on a code that already has children, since the
    /// children's parent rule would break.
    pub fn validate_kind_change(
        id: Uuid,
        current: CodeKind,
        next: CodeKind,
        has_children: bool,
    ) -> Result<(), TaxonomyError> {
        if current != next && has_children {
            return Err(TaxonomyError::HasChildren(id));
        }
        Ok(())
    }
}

fn is_group_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit())
}
