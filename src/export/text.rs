//! Plain-text rendering of analysis outcomes.

use std::fmt::{self, Write};

use crate::batch::FileOutcome;
use crate::model::report::FileReport;
use crate::model::verdict::VerdictColor;

const RESET: &str = "\x1b[0m";

fn ansi(color: VerdictColor) -> &'static str {
    match color {
        VerdictColor::Green => "\x1b[32m",
        VerdictColor::Orange => "\x1b[33m",
        VerdictColor::Red => "\x1b[31m",
    }
}

/// Render one outcome: full report, skip notice or error message.
pub fn render_outcome(outcome: &FileOutcome, colored: bool) -> String {
    match outcome {
        FileOutcome::Analyzed(report) => render_report(report, colored),
        FileOutcome::Skipped { file, reason } => {
            format!("### File: {file}\n  Skipped: {reason}\n")
        }
        FileOutcome::Failed { file, error } => {
            format!("### File: {file}\n  Error processing file: {error}\n")
        }
    }
}

/// Render the headers, key fields, authentication summary and verdict.
pub fn render_report(report: &FileReport, colored: bool) -> String {
    TextReport { report, colored }.to_string()
}

struct TextReport<'a> {
    report: &'a FileReport,
    colored: bool,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self.report, self.colored)
    }
}

fn write_report(out: &mut impl Write, report: &FileReport, colored: bool) -> fmt::Result {
    writeln!(out, "### File: {}", report.file)?;

    writeln!(out, "\nAll Headers")?;
    for (name, value) in report.headers.iter() {
        writeln!(out, "  {name}: {value}")?;
    }

    writeln!(out, "\nKey Email Info")?;
    writeln!(out, "  From: {}", report.from)?;
    writeln!(out, "  To: {}", report.to)?;
    writeln!(out, "  Cc: {}", report.cc)?;
    writeln!(out, "  Bcc: {}", report.bcc)?;
    writeln!(out, "  Subject: {}", report.subject)?;
    writeln!(out, "  Date: {}", report.date)?;
    writeln!(out, "  Message-ID: {}", report.message_id)?;
    if let Some(submit) = &report.submit_time {
        write!(out, "  Submit Time: {submit}")?;
        if let Some(utc) = submit.to_utc() {
            write!(out, " (UTC {})", utc.format("%Y-%m-%d %H:%M:%S"))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "\nAuthentication / Security Info")?;
    writeln!(out, "  SPF: {}", report.auth.spf)?;
    writeln!(out, "  DKIM: {}", report.auth.dkim)?;
    writeln!(out, "  DMARC: {}", report.auth.dmarc)?;

    writeln!(out, "\nEmail Legitimacy Check")?;
    if colored {
        writeln!(
            out,
            "  Result: {}{}{RESET}",
            ansi(report.color()),
            report.verdict
        )?;
    } else {
        writeln!(out, "  Result: {}", report.verdict)?;
    }
    if report.reasons.is_empty() {
        writeln!(out, "  All key criteria present.")?;
    } else {
        writeln!(out, "  Reason(s): {}", report.reasons.join(", "))?;
    }

    Ok(())
}
