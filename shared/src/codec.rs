//! Boundary codec — JSON marshaling between host and filter module
//!
//! The wire format is field-named JSON: self-describing, open to unknown
//! structure inside `headers`, and identical in both directions. A payload
//! that fails to decode is a fatal error for that call, reported as
//! [`FilterError::Decode`], never papered over with a default value.

use serde_json::Value;

use crate::error::FilterError;
use crate::types::filter::{FilterInput, MatchResult};

pub fn encode_params(params: &[Value]) -> Result<Vec<u8>, FilterError> {
    serde_json::to_vec(params).map_err(|e| FilterError::Decode(e.to_string()))
}

pub fn decode_params(bytes: &[u8]) -> Result<Vec<Value>, FilterError> {
    serde_json::from_slice(bytes).map_err(|e| FilterError::Decode(e.to_string()))
}

pub fn encode_input(input: &FilterInput) -> Result<Vec<u8>, FilterError> {
    serde_json::to_vec(input).map_err(|e| FilterError::Decode(e.to_string()))
}

pub fn decode_input(bytes: &[u8]) -> Result<FilterInput, FilterError> {
    serde_json::from_slice(bytes).map_err(|e| FilterError::Decode(e.to_string()))
}

pub fn encode_result(result: &MatchResult) -> Result<Vec<u8>, FilterError> {
    serde_json::to_vec(result).map_err(|e| FilterError::Decode(e.to_string()))
}

pub fn decode_result(bytes: &[u8]) -> Result<MatchResult, FilterError> {
    serde_json::from_slice(bytes).map_err(|e| FilterError::Decode(e.to_string()))
}
