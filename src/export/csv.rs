//! Export analysis records to CSV.
//!
//! Output is UTF-8 with BOM for Excel compatibility.

use std::io::Write;
use std::path::Path;

use crate::model::report::FileReport;

const COLUMNS: &str =
    "File,From,To,Subject,Date,Message-ID,Submit Time,SPF,DKIM,DMARC,Legitimacy Result,Reasons";

/// Export one row per analyzed file. Reasons are joined with `"; "`.
pub fn export_csv(reports: &[&FileReport], output_path: &Path) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_csv(reports, &mut file)?;
    tracing::info!(path = %output_path.display(), rows = reports.len(), "Exported CSV");
    Ok(())
}

/// Write the CSV document (BOM, header row, data rows) to `writer`.
pub fn write_csv<W: Write>(reports: &[&FileReport], writer: &mut W) -> anyhow::Result<()> {
    // UTF-8 BOM for Excel
    writer.write_all(&[0xEF, 0xBB, 0xBF])?;
    writeln!(writer, "{COLUMNS}")?;

    for report in reports {
        let submit_time = report
            .submit_time
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_default();
        let fields = [
            report.file.clone(),
            report.from.clone(),
            report.to.clone(),
            report.subject.clone(),
            report.date.clone(),
            report.message_id.clone(),
            submit_time,
            report.auth.spf.to_string(),
            report.auth.dkim.to_string(),
            report.auth.dmarc.to_string(),
            report.verdict.to_string(),
            report.reasons.join("; "),
        ];
        let row = fields
            .iter()
            .map(|f| csv_escape(f))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{row}")?;
    }

    Ok(())
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
