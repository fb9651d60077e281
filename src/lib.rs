//! `mailverdict` — header extraction and legitimacy heuristics for `.eml`
//! and Outlook `.msg` files.
//!
//! The pipeline per file is: [`parser::extract`] → [`classify::classify`] →
//! [`classify::verdict`]. [`batch`] wraps it with a size gate and per-file
//! error isolation; [`export`] turns the results into text, JSON or CSV.

pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
