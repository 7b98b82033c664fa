//! Typed journal filter shared by listing and bulk posting.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::error::LedgerError;
use super::sequence::is_sequence_value;
use super::types::JournalStatus;

/// Filter over journals. Every field is optional; set fields are ANDed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalFilter {
    /// Restrict to one fiscal year.
    pub fiscal_year_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<JournalStatus>,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_to: Option<NaiveDate>,
    /// Inclusive lower bound on the numeric journal code.
    pub code_from: Option<String>,
    /// Inclusive upper bound on the numeric journal code.
    pub code_to: Option<String>,
    /// Free text matched against description, ref_no and code.
    pub search: Option<String>,
}

/// A validated filter with parsed bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFilter {
    /// Fiscal year.
    pub fiscal_year_id: Option<Uuid>,
    /// Status.
    pub status: Option<JournalStatus>,
    /// Lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Upper date bound.
    pub date_to: Option<NaiveDate>,
    /// Lower numeric code bound.
    pub code_from: Option<i64>,
    /// Upper numeric code bound.
    pub code_to: Option<i64>,
    /// ILIKE pattern with wildcards escaped.
    pub search_pattern: Option<String>,
}

impl JournalFilter {
    /// Validates bounds and builds the compiled form.
    pub fn compile(&self) -> Result<CompiledFilter, LedgerError> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to)
            && from > to
        {
            return Err(LedgerError::InvalidFilter(format!(
                "date_from {from} is after date_to {to}"
            )));
        }

        let code_from = parse_code_bound("code_from", self.code_from.as_deref())?;
        let code_to = parse_code_bound("code_to", self.code_to.as_deref())?;
        if let (Some(from), Some(to)) = (code_from, code_to)
            && from > to
        {
            return Err(LedgerError::InvalidFilter(format!(
                "code_from {from} is after code_to {to}"
            )));
        }

        let search_pattern = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        Ok(CompiledFilter {
            fiscal_year_id: self.fiscal_year_id,
            status: self.status,
            date_from: self.date_from,
            date_to: self.date_to,
            code_from,
            code_to,
            search_pattern,
        })
    }
}

fn parse_code_bound(name: &str, value: Option<&str>) -> Result<Option<i64>, LedgerError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if !is_sequence_value(raw) {
        return Err(LedgerError::InvalidFilter(format!("{name} must be numeric")));
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| LedgerError::InvalidFilter(format!("{name} is out of range")))
}

/// Escapes `\`, `%` and `_` so user text matches literally inside ILIKE.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
