//! Payment instruments.
//!
//! Each receipt/payment item is settled through one instrument. Cash has no
//! backing resource; the others point at exactly one card reader, bank
//! account or check.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::TreasuryError;

/// Kind of instrument on a document item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    /// Cash handled by a cashbox.
    Cash,
    /// Card payment through a card reader.
    Card,
    /// Bank transfer into or out of a bank account.
    Transfer,
    /// Check.
    Check,
}

impl InstrumentType {
    /// All instrument types.
    pub const ALL: [Self; 4] = [Self::Cash, Self::Card, Self::Transfer, Self::Check];

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
            Self::Check => "check",
        }
    }

    /// Parses an instrument type.
    pub fn parse(s: &str) -> Result<Self, TreasuryError> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "transfer" => Ok(Self::Transfer),
            "check" => Ok(Self::Check),
            other => Err(TreasuryError::InvalidInstrumentType(other.to_string())),
        }
    }

    /// Cash and checks are physically kept, so the document needs a cashbox.
    #[must_use]
    pub fn requires_cashbox(&self) -> bool {
        matches!(self, Self::Cash | Self::Check)
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An instrument together with the resource behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentRef {
    /// Cash; no link row.
    Cash,
    /// Card reader id.
    Card(Uuid),
    /// Bank account id.
    Transfer(Uuid),
    /// Check id.
    Check(Uuid),
}

impl InstrumentRef {
    /// Builds the reference from an item's type and optional source id.
    ///
    /// Any source id given with cash is ignored.
    pub fn parse(kind: InstrumentType, source_id: Option<Uuid>) -> Result<Self, TreasuryError> {
        let require = || source_id.ok_or(TreasuryError::InstrumentSourceRequired(kind.as_str()));
        match kind {
            InstrumentType::Cash => Ok(Self::Cash),
            InstrumentType::Card => Ok(Self::Card(require()?)),
            InstrumentType::Transfer => Ok(Self::Transfer(require()?)),
            InstrumentType::Check => Ok(Self::Check(require()?)),
        }
    }

    /// The instrument type.
    #[must_use]
    pub fn instrument_type(&self) -> InstrumentType {
        match self {
            Self::Cash => InstrumentType::Cash,
            Self::Card(_) => InstrumentType::Card,
            Self::Transfer(_) => InstrumentType::Transfer,
            Self::Check(_) => InstrumentType::Check,
        }
    }

    /// The backing resource id, `None` for cash.
    #[must_use]
    pub fn source_id(&self) -> Option<Uuid> {
        match self {
            Self::Cash => None,
            Self::Card(id) | Self::Transfer(id) | Self::Check(id) => Some(*id),
        }
    }
}
