//! Shared types and wire codec for sift filters
//!
//! This crate contains the data model crossing the host/filter boundary:
//! the consumed record, the filter input and verdict types, the contract
//! errors, and the JSON codec both sides marshal through.

pub mod codec;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::FilterError;
pub use types::filter::{FilterInput, MatchResult};
pub use types::record::Record;
