//! Entry-point glue shared by every filter: decode, delegate, encode
//!
//! Kept separate from the WASM ABI so the exact behavior of an entry
//! point — decode failures included — can be exercised natively in tests.

use serde_json::Value;
use sift_shared::codec;
use sift_shared::{FilterError, FilterInput, MatchResult};

/// Run a parameter validator against a serialized parameter list.
///
/// Success produces no payload; the status code alone tells the host the
/// parameters were accepted.
pub fn run_validate<F>(payload: &[u8], validate: F) -> Result<(), FilterError>
where
    F: FnOnce(&[Value]) -> Result<(), FilterError>,
{
    let params = codec::decode_params(payload)?;
    validate(&params)
}

/// Run a matcher against a serialized [`FilterInput`], returning the
/// serialized [`MatchResult`] payload.
pub fn run_evaluate<F>(payload: &[u8], matches: F) -> Result<Vec<u8>, FilterError>
where
    F: FnOnce(&FilterInput) -> Result<MatchResult, FilterError>,
{
    let input = codec::decode_input(payload)?;
    let result = matches(&input)?;
    codec::encode_result(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sift_shared::Record;

    fn always_match(_input: &FilterInput) -> Result<MatchResult, FilterError> {
        Ok(true.into())
    }

    #[test]
    fn validate_decodes_before_delegating() {
        let called = std::cell::Cell::new(false);
        let result = run_validate(br#"["west", 7]"#, |params| {
            called.set(true);
            assert_eq!(params, [json!("west"), json!(7)]);
            Ok(())
        });
        assert!(result.is_ok());
        assert!(called.get());
    }

    #[test]
    fn malformed_params_never_reach_the_validator() {
        let result = run_validate(b"{not json", |_| panic!("must not be called"));
        assert!(matches!(result.unwrap_err(), FilterError::Decode(_)));
    }

    #[test]
    fn evaluate_encodes_the_verdict() {
        let input = FilterInput {
            record: Record::default(),
            params: vec![],
        };
        let payload = codec::encode_input(&input).unwrap();
        let result = run_evaluate(&payload, always_match).unwrap();
        assert_eq!(result, br#"{"match":true}"#);
    }

    #[test]
    fn malformed_input_is_a_decode_error_not_a_non_match() {
        let result = run_evaluate(b"\x00\x01garbage", always_match);
        assert!(matches!(result.unwrap_err(), FilterError::Decode(_)));
    }

    #[test]
    fn matcher_errors_propagate() {
        let input = FilterInput {
            record: Record::default(),
            params: vec![],
        };
        let payload = codec::encode_input(&input).unwrap();
        let result = run_evaluate(&payload, |_| Err(FilterError::runtime("invalid state")));
        assert_eq!(
            result.unwrap_err(),
            FilterError::Runtime("invalid state".to_string())
        );
    }
}
