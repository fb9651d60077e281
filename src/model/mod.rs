//! Core data model: headers, authentication summary, verdicts and reports.

pub mod auth;
pub mod headers;
pub mod report;
pub mod verdict;
