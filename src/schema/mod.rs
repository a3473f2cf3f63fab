//! Schema module - Candidate, scoring and configuration types for the search engine.

mod candidate;
mod config;

pub use candidate::*;
pub use config::*;
