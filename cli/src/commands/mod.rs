//! CLI command implementations

use serde_json::Value;

pub mod check;
pub mod run;

/// Parse a user-supplied filter parameter.
///
/// The search-query syntax allows string and integer arguments, so a value
/// that parses as an integer is passed as a number and everything else is
/// passed as a string.
pub fn parse_param(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(raw),
    }
}
