//! Batch analysis: size gate, per-file error isolation and ordered outcomes.
//!
//! Files are processed one after another. Nothing is shared between files,
//! so a failure in one never affects the others.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::classify::{classify, verdict};
use crate::config::{Config, ParserConfig, DEFAULT_MAX_FILE_SIZE};
use crate::error::{AnalyzeError, Result};
use crate::model::report::FileReport;
use crate::parser::{self, Extracted, MailFormat};

/// Settings that apply to every file of a batch.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Files above this many bytes are skipped before parsing.
    pub max_file_size: u64,
    pub parser: ParserConfig,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            parser: ParserConfig::default(),
        }
    }
}

impl AnalyzeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_file_size: config.limits.max_file_size,
            parser: config.parser.clone(),
        }
    }
}

/// What happened to one file of a batch.
#[derive(Debug)]
pub enum FileOutcome {
    Analyzed(Box<FileReport>),
    /// Over the size limit; produces no record.
    Skipped { file: String, reason: String },
    /// Could not be read or parsed.
    Failed { file: String, error: AnalyzeError },
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            Self::Analyzed(report) => &report.file,
            Self::Skipped { file, .. } | Self::Failed { file, .. } => file,
        }
    }

    pub fn report(&self) -> Option<&FileReport> {
        match self {
            Self::Analyzed(report) => Some(&**report),
            _ => None,
        }
    }
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(outcomes: &[FileOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Analyzed(_) => summary.analyzed += 1,
                FileOutcome::Skipped { .. } => summary.skipped += 1,
                FileOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

/// Analyze an in-memory file. `name` carries the extension that declares
/// the format.
pub fn analyze_bytes(name: &str, data: &[u8], options: &AnalyzeOptions) -> Result<FileReport> {
    check_size(name, data.len() as u64, options.max_file_size)?;
    let format = MailFormat::from_name(name)?;

    let Extracted {
        headers,
        submit_time,
    } = parser::extract_with(data, format, &options.parser)?;

    let auth = classify(&headers);
    let verdict = verdict(&headers, &auth);
    info!(
        file = name,
        verdict = %verdict.kind,
        reasons = verdict.reasons.len(),
        "Classified"
    );

    Ok(FileReport::new(name, headers, submit_time, auth, verdict))
}

/// Analyze a file on disk. The size gate is checked against the file's
/// metadata before anything is read.
pub fn analyze_path(path: &Path, options: &AnalyzeOptions) -> FileOutcome {
    let name = display_name(path);
    let result = read_gated(path, &name, options.max_file_size)
        .and_then(|data| analyze_bytes(&name, &data, options));
    into_outcome(name, result)
}

/// Analyze files in order, continuing past skips and failures.
///
/// The progress callback receives `(current, total)`.
pub fn analyze_batch(
    paths: &[PathBuf],
    options: &AnalyzeOptions,
    progress: Option<&dyn Fn(usize, usize)>,
) -> Vec<FileOutcome> {
    let total = paths.len();
    let mut outcomes = Vec::with_capacity(total);

    for (i, path) in paths.iter().enumerate() {
        if let Some(cb) = progress {
            cb(i, total);
        }
        outcomes.push(analyze_path(path, options));
    }
    if let Some(cb) = progress {
        cb(total, total);
    }

    outcomes
}

/// Analyze in-memory `(name, bytes)` blobs in order.
pub fn analyze_blobs<'a, I>(blobs: I, options: &AnalyzeOptions) -> Vec<FileOutcome>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    blobs
        .into_iter()
        .map(|(name, data)| into_outcome(name.to_string(), analyze_bytes(name, data, options)))
        .collect()
}

fn check_size(file: &str, size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(AnalyzeError::SizeLimitExceeded {
            file: file.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

fn read_gated(path: &Path, name: &str, limit: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AnalyzeError::FileNotFound(path.to_path_buf())
        } else {
            AnalyzeError::io(path, e)
        }
    })?;
    check_size(name, metadata.len(), limit)?;

    debug!(path = %path.display(), size = metadata.len(), "Reading file");
    std::fs::read(path).map_err(|e| AnalyzeError::io(path, e))
}

fn into_outcome(file: String, result: Result<FileReport>) -> FileOutcome {
    match result {
        Ok(report) => FileOutcome::Analyzed(Box::new(report)),
        Err(e @ AnalyzeError::SizeLimitExceeded { .. }) => {
            warn!(file = %file, "Skipping oversized file: {e}");
            FileOutcome::Skipped {
                file,
                reason: e.to_string(),
            }
        }
        Err(e) => {
            error!(file = %file, error = %e, "Error processing file");
            debug!(file = %file, error = ?e, "Error details");
            FileOutcome::Failed { file, error: e }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::verdict::VerdictKind;

    const EML: &[u8] = b"Received: from x\r\nMessage-ID: <a@b>\r\n\r\nbody\r\n";

    #[test]
    fn test_analyze_bytes() {
        let report = analyze_bytes("a.eml", EML, &AnalyzeOptions::default()).unwrap();
        assert_eq!(report.file, "a.eml");
        assert_eq!(report.verdict, VerdictKind::Legitimate);
        assert_eq!(report.reasons.len(), 3);
    }

    #[test]
    fn test_size_gate_skips() {
        let options = AnalyzeOptions {
            max_file_size: 10,
            ..Default::default()
        };
        let outcomes = analyze_blobs([("big.eml", EML)], &options);
        assert!(matches!(outcomes[0], FileOutcome::Skipped { .. }));
        assert!(outcomes[0].report().is_none());
    }

    #[test]
    fn test_limit_is_inclusive() {
        let options = AnalyzeOptions {
            max_file_size: EML.len() as u64,
            ..Default::default()
        };
        assert!(analyze_bytes("edge.eml", EML, &options).is_ok());
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let blobs: [(&str, &[u8]); 3] = [
            ("bad.msg", b"not a compound file"),
            ("notes.txt", EML),
            ("good.eml", EML),
        ];
        let outcomes = analyze_blobs(blobs, &AnalyzeOptions::default());
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], FileOutcome::Failed { .. }));
        assert!(matches!(outcomes[1], FileOutcome::Failed { .. }));
        assert_eq!(outcomes[2].file(), "good.eml");
        assert_eq!(
            BatchSummary::of(&outcomes),
            BatchSummary {
                analyzed: 1,
                skipped: 0,
                failed: 2
            }
        );
    }

    #[test]
    fn test_eight_bit_received_stays_legitimate() {
        let data: &[u8] =
            b"Received: from relay.ex\xe9mple.com by mx.example.net\r\nMessage-ID: <a@b>\r\nSubject: hi\r\n\r\nbody";
        let report = analyze_bytes("latin1.eml", data, &AnalyzeOptions::default()).unwrap();
        assert_eq!(report.verdict, VerdictKind::Legitimate);
        assert_eq!(report.headers.len(), 3);
    }

    #[test]
    fn test_headerless_eml_is_analyzed() {
        let report = analyze_bytes("empty.eml", b"", &AnalyzeOptions::default()).unwrap();
        assert_eq!(report.verdict, VerdictKind::PossiblyFake);
        assert_eq!(report.reasons.len(), 5);
    }

    #[test]
    fn test_missing_path() {
        let outcome = analyze_path(Path::new("/nonexistent/x.eml"), &AnalyzeOptions::default());
        match outcome {
            FileOutcome::Failed { file, error } => {
                assert_eq!(file, "x.eml");
                assert!(matches!(error, AnalyzeError::FileNotFound(_)));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
