//! Week-range and member-name filtering of the deposit ledger.

use crate::models::Deposit;
use serde::Serialize;
use std::fmt;

/// Selects the deposits that feed member and weekly aggregation.
///
/// A deposit is kept when `week_from <= week <= week_to` and, if a query is
/// set, the member name contains it case-insensitively. Inverted ranges are
/// kept as given and match nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositFilter {
    pub week_from: u32,
    pub week_to: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(skip)]
    needle: String,
}

impl Default for DepositFilter {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl DepositFilter {
    /// Build a filter; omitted bounds leave that side of the range open.
    pub fn new(week_from: Option<u32>, week_to: Option<u32>, query: Option<&str>) -> Self {
        let query = query.map(str::trim).unwrap_or("").to_string();
        Self {
            week_from: week_from.unwrap_or(0),
            week_to: week_to.unwrap_or(u32::MAX),
            needle: query.to_lowercase(),
            query,
        }
    }

    /// True when the range can never match.
    pub fn is_inverted(&self) -> bool {
        self.week_from > self.week_to
    }

    /// True when every deposit passes.
    pub fn is_unrestricted(&self) -> bool {
        self.week_from == 0 && self.week_to == u32::MAX && self.query.is_empty()
    }

    /// Check a single deposit against the filter.
    pub fn matches(&self, deposit: &Deposit) -> bool {
        if deposit.week < self.week_from || deposit.week > self.week_to {
            return false;
        }

        self.needle.is_empty() || deposit.member.to_lowercase().contains(&self.needle)
    }

    /// Return the matching deposits, leaving the source untouched.
    pub fn apply(&self, deposits: &[Deposit]) -> Vec<Deposit> {
        deposits
            .iter()
            .filter(|d| self.matches(d))
            .cloned()
            .collect()
    }
}

impl fmt::Display for DepositFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.week_from, self.week_to) {
            (0, u32::MAX) => write!(f, "all weeks")?,
            (from, u32::MAX) => write!(f, "weeks {}+", from)?,
            (0, to) => write!(f, "weeks up to {}", to)?,
            (from, to) => write!(f, "weeks {}-{}", from, to)?,
        }

        if !self.query.is_empty() {
            write!(f, ", members matching \"{}\"", self.query)?;
        }

        Ok(())
    }
}
