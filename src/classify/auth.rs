//! SPF / DKIM / DMARC marker detection.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::auth::{AuthResult, AuthSummary};
use crate::model::headers::HeaderSet;

// Matched anywhere in the rendered header text, so `Received-SPF: pass` and
// `Authentication-Results: ... spf=pass` both count.
static SPF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SPF[:=]\s*([^\s;]+)").expect("valid SPF regex"));
static DKIM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DKIM-Signature:").expect("valid DKIM regex"));
static DMARC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dmarc=([^\s;]+)").expect("valid DMARC regex"));

/// Summarize authentication markers over every header occurrence.
pub fn classify(headers: &HeaderSet) -> AuthSummary {
    let text = headers.rendered();

    AuthSummary {
        spf: first_capture(&SPF_RE, &text),
        dkim: if DKIM_RE.is_match(&text) {
            AuthResult::Present
        } else {
            AuthResult::NotFound
        },
        dmarc: first_capture(&DMARC_RE, &text),
    }
}

fn first_capture(re: &Regex, text: &str) -> AuthResult {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| AuthResult::Value(m.as_str().to_string()))
        .unwrap_or(AuthResult::NotFound)
}
