//! Ordered verdict rules.

use crate::model::auth::AuthSummary;
use crate::model::headers::HeaderSet;
use crate::model::verdict::{Verdict, VerdictKind};

/// One row of the decision table.
struct Rule {
    kind: VerdictKind,
    applies: fn(&HeaderSet) -> bool,
    reasons: &'static [&'static str],
}

fn has_received(headers: &HeaderSet) -> bool {
    headers.has_value("Received")
}

fn has_message_id(headers: &HeaderSet) -> bool {
    headers.has_value("Message-ID")
}

fn always(_: &HeaderSet) -> bool {
    true
}

/// Evaluated top to bottom; the first rule that applies decides the verdict.
/// The last rule always applies.
static RULES: &[Rule] = &[
    Rule {
        kind: VerdictKind::Legitimate,
        applies: has_received,
        reasons: &[],
    },
    Rule {
        kind: VerdictKind::PossiblyLegitimate,
        applies: has_message_id,
        reasons: &["No Received headers found, but Message-ID exists"],
    },
    Rule {
        kind: VerdictKind::PossiblyFake,
        applies: always,
        reasons: &["No Received headers found", "No Message-ID found"],
    },
];

/// Decide the verdict, then append missing-authentication reasons in the
/// fixed order SPF, DKIM, DMARC.
pub fn verdict(headers: &HeaderSet, auth: &AuthSummary) -> Verdict {
    let rule = RULES
        .iter()
        .find(|r| (r.applies)(headers))
        .unwrap_or(&RULES[RULES.len() - 1]);

    let mut reasons: Vec<String> = rule.reasons.iter().map(|r| r.to_string()).collect();

    let missing = [
        (&auth.spf, "No SPF record / check missing"),
        (&auth.dkim, "No DKIM signature"),
        (&auth.dmarc, "No DMARC record / check missing"),
    ];
    reasons.extend(
        missing
            .into_iter()
            .filter(|(result, _)| !result.is_found())
            .map(|(_, reason)| reason.to_string()),
    );

    Verdict {
        kind: rule.kind,
        reasons,
    }
}
