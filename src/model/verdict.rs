//! Legitimacy verdict types.

use std::fmt;

use serde::{Serialize, Serializer};

/// Categorical legitimacy outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictKind {
    /// The message carries relay trace headers.
    Legitimate,
    /// No relay trace, but a Message-ID was assigned (exported web copy or
    /// incomplete headers).
    PossiblyLegitimate,
    /// Neither relay trace nor Message-ID (draft or fabricated).
    PossiblyFake,
}

/// Display color tag for a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictColor {
    Green,
    Orange,
    Red,
}

impl VerdictKind {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Legitimate => "Likely Legitimate",
            Self::PossiblyLegitimate => {
                "Possibly Legitimate (exported web copy / incomplete headers)"
            }
            Self::PossiblyFake => "Possibly Fake / Draft",
        }
    }

    pub fn color(self) -> VerdictColor {
        match self {
            Self::Legitimate => VerdictColor::Green,
            Self::PossiblyLegitimate => VerdictColor::Orange,
            Self::PossiblyFake => VerdictColor::Red,
        }
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for VerdictKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A verdict together with the reasons that led to it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn color(&self) -> VerdictColor {
        self.kind.color()
    }
}
