//! Export and rendering of analysis results: JSON, CSV and plain text.

pub mod csv;
pub mod json;
pub mod text;
