//! Key suffix filter
//!
//! Returns `match = true` when the record key ends with the user-supplied
//! string parameter, byte-wise and case-sensitive:
//!
//! ```sql
//! key-ends-with("west")
//! ```

use sift_filter::{export_filter, FilterError, FilterInput, MatchResult, Value};

/// Accept exactly one string argument.
pub fn validate(params: &[Value]) -> Result<(), FilterError> {
    if params.len() != 1 {
        return Err(FilterError::validation(format!(
            "key-ends-with expects exactly 1 string argument, found {} arguments",
            params.len()
        )));
    }
    match &params[0] {
        Value::String(_) => Ok(()),
        other => Err(FilterError::validation(format!(
            "key-ends-with expects argument 1 to be a string, found {other}"
        ))),
    }
}

/// Suffix comparison against the record key.
///
/// The parameter list is re-checked here: being evaluated without a prior
/// successful validation is a contract violation and must surface as an
/// error, not as a silent non-match.
pub fn matches(input: &FilterInput) -> Result<MatchResult, FilterError> {
    let Some(param) = input.params.first() else {
        return Err(FilterError::runtime(
            "key-ends-with evaluated with an empty parameter list",
        ));
    };
    let Some(suffix) = param.as_str() else {
        return Err(FilterError::runtime(format!(
            "key-ends-with evaluated with a non-string argument: {param}"
        )));
    };
    Ok(input.record.key.ends_with(suffix).into())
}

export_filter!(validate, matches);
