//! Input and output types for the two filter entry points

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::Record;

/// Everything a filter sees for one evaluation: the consumed record and
/// the parameters the user passed to the predicate in the search query.
///
/// For the query `key-ends-with("west")`, the input serialized as JSON is:
///
/// ```json
/// {
///     "record": {
///         "value": "Hello world",
///         "key": "orders-eu-west",
///         "topic": "orders",
///         "timestamp": 1717842091489,
///         "partition": 0,
///         "offset": 23,
///         "headers": {
///             "my-header": "my-value"
///         }
///     },
///     "params": [
///         "west"
///     ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterInput {
    pub record: Record,
    /// User-supplied predicate arguments, strings or numbers
    pub params: Vec<Value>,
}

/// Verdict of one evaluation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// `true` if the record matches the predicate
    #[serde(rename = "match")]
    pub matched: bool,
}

impl From<bool> for MatchResult {
    fn from(matched: bool) -> Self {
        Self { matched }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_result_wire_field_is_named_match() {
        let json = serde_json::to_string(&MatchResult::from(true)).unwrap();
        assert_eq!(json, r#"{"match":true}"#);

        let parsed: MatchResult = serde_json::from_str(r#"{"match":false}"#).unwrap();
        assert!(!parsed.matched);
    }
}
