//! Declared file format, taken from the file name.

use std::fmt;
use std::path::Path;

use crate::error::{AnalyzeError, Result};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailFormat {
    /// Outlook message in an OLE compound file.
    Msg,
    /// Plain RFC 5322 message.
    Eml,
}

impl MailFormat {
    /// Detect the format from a file name's extension (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("msg") => Ok(Self::Msg),
            Some("eml") => Ok(Self::Eml),
            _ => Err(AnalyzeError::UnsupportedFormat(format!(
                "'{name}' is neither a .msg nor an .eml file"
            ))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Msg => "msg",
            Self::Eml => "eml",
        }
    }
}

impl fmt::Display for MailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(MailFormat::from_name("a.msg").unwrap(), MailFormat::Msg);
        assert_eq!(MailFormat::from_name("dir/B.EML").unwrap(), MailFormat::Eml);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = MailFormat::from_name("notes.txt").unwrap_err();
        assert!(err.is_format_error());
        assert!(MailFormat::from_name("no_extension").is_err());
    }
}
