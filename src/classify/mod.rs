//! Legitimacy classification from header text.
//!
//! Nothing here verifies signatures or queries DNS: SPF, DKIM and DMARC are
//! judged purely by marker text in the headers.

pub mod auth;
pub mod rules;

pub use auth::classify;
pub use rules::verdict;
