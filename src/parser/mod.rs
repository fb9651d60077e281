//! Header extraction for `.eml` and Outlook `.msg` files.

pub mod eml;
pub mod format;
pub mod header;
pub mod msg;

use tracing::debug;

pub use format::MailFormat;

use crate::config::ParserConfig;
use crate::error::Result;
use crate::model::headers::HeaderSet;
use crate::model::report::SubmitTime;

/// Headers and submission time pulled out of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub headers: HeaderSet,
    pub submit_time: Option<SubmitTime>,
}

/// Extract headers from `data` using the default parser settings.
pub fn extract(data: &[u8], format: MailFormat) -> Result<Extracted> {
    extract_with(data, format, &ParserConfig::default())
}

/// Extract headers from `data` declared as `format`.
///
/// Fails with [`crate::error::AnalyzeError::Format`] when the container or
/// header block cannot be read.
pub fn extract_with(data: &[u8], format: MailFormat, config: &ParserConfig) -> Result<Extracted> {
    let extracted = match format {
        MailFormat::Eml => eml::extract_eml(data)?,
        MailFormat::Msg => msg::extract_msg(data, config.unfold_msg_headers)?,
    };
    debug!(
        %format,
        headers = extracted.headers.len(),
        has_submit_time = extracted.submit_time.is_some(),
        "Extracted headers"
    );
    Ok(extracted)
}
