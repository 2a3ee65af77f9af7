//! Value substring filter example
//!
//! Keeps records whose payload contains the given substring:
//!
//! ```sql
//! value-contains("error")
//! ```

use sift_filter::*;

fn validate(params: &[Value]) -> Result<(), FilterError> {
    match params {
        [Value::String(_)] => Ok(()),
        [other] => Err(FilterError::validation(format!(
            "value-contains expects argument 1 to be a string, found {other}"
        ))),
        _ => Err(FilterError::validation(format!(
            "value-contains expects exactly 1 string argument, found {} arguments",
            params.len()
        ))),
    }
}

fn matches(input: &FilterInput) -> Result<MatchResult, FilterError> {
    let needle = input
        .params
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| FilterError::runtime("value-contains evaluated without its string argument"))?;
    Ok(input.record.value.contains(needle).into())
}

export_filter!(validate, matches);
