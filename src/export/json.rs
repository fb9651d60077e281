//! Export analysis records as a JSON array.

use std::io::Write;
use std::path::Path;

use crate::model::report::FileReport;

/// Serialize the records of analyzed files.
pub fn to_json(reports: &[&FileReport], pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(reports)?
    } else {
        serde_json::to_string(reports)?
    };
    Ok(json)
}

/// Write the records to `writer`, followed by a newline.
pub fn write_json<W: Write>(
    reports: &[&FileReport],
    writer: &mut W,
    pretty: bool,
) -> anyhow::Result<()> {
    writeln!(writer, "{}", to_json(reports, pretty)?)?;
    Ok(())
}

/// Write the records to a file.
pub fn export_json(reports: &[&FileReport], output_path: &Path, pretty: bool) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_json(reports, &mut file, pretty)?;
    tracing::info!(path = %output_path.display(), records = reports.len(), "Exported JSON");
    Ok(())
}
