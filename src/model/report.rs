//! Per-file analysis record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::auth::AuthSummary;
use super::headers::HeaderSet;
use super::verdict::{Verdict, VerdictColor, VerdictKind};
use crate::parser::header::parse_date;

/// When the message was submitted, as far as the file can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTime {
    /// Raw `Date` header text, kept as written.
    Header(String),
    /// Timestamp stored natively by the container (`.msg` client submit time).
    Native(DateTime<Utc>),
}

impl SubmitTime {
    /// Best-effort UTC normalization.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Header(raw) => parse_date(raw),
            Self::Native(dt) => Some(*dt),
        }
    }
}

impl fmt::Display for SubmitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(raw) => f.write_str(raw),
            Self::Native(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%:z")),
        }
    }
}

impl Serialize for SubmitTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Everything learned about one file.
///
/// Serializes to the exported record:
/// `{File, From, To, Subject, Date, Message-ID, Submit Time, SPF, DKIM,
/// DMARC, Legitimacy Result, Reasons}`. The full header list, `Cc`, `Bcc`
/// and the color tag are kept for rendering only.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(skip)]
    pub cc: String,
    #[serde(skip)]
    pub bcc: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Message-ID")]
    pub message_id: String,
    #[serde(rename = "Submit Time")]
    pub submit_time: Option<SubmitTime>,
    #[serde(flatten)]
    pub auth: AuthSummary,
    #[serde(rename = "Legitimacy Result")]
    pub verdict: VerdictKind,
    #[serde(rename = "Reasons")]
    pub reasons: Vec<String>,
    #[serde(skip)]
    pub headers: HeaderSet,
}

impl FileReport {
    /// Assemble a report from the extractor and classifier outputs.
    pub fn new(
        file: impl Into<String>,
        headers: HeaderSet,
        submit_time: Option<SubmitTime>,
        auth: AuthSummary,
        verdict: Verdict,
    ) -> Self {
        Self {
            file: file.into(),
            from: headers.sender().to_string(),
            to: headers.to().to_string(),
            cc: headers.cc().to_string(),
            bcc: headers.bcc().to_string(),
            subject: headers.subject().to_string(),
            date: headers.date().to_string(),
            message_id: headers.message_id().to_string(),
            submit_time,
            auth,
            verdict: verdict.kind,
            reasons: verdict.reasons,
            headers,
        }
    }

    pub fn color(&self) -> VerdictColor {
        self.verdict.color()
    }
}
