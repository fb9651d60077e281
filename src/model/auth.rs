//! Authentication marker summary.

use std::fmt;

use serde::{Serialize, Serializer};

/// Outcome of looking for one authentication marker in the header text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// A token was captured after the marker (e.g. `pass`, `fail`).
    Value(String),
    /// The marker exists but carries no captured value (DKIM).
    Present,
    /// The marker does not appear anywhere.
    NotFound,
}

impl AuthResult {
    pub fn is_found(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

impl fmt::Display for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.write_str(v),
            Self::Present => f.write_str("Present"),
            Self::NotFound => f.write_str("Not Found"),
        }
    }
}

impl Serialize for AuthResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// SPF / DKIM / DMARC presence, derived from header text only.
///
/// DKIM is only ever [`AuthResult::Present`] or [`AuthResult::NotFound`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSummary {
    #[serde(rename = "SPF")]
    pub spf: AuthResult,
    #[serde(rename = "DKIM")]
    pub dkim: AuthResult,
    #[serde(rename = "DMARC")]
    pub dmarc: AuthResult,
}
