//! Offset floor filter example
//!
//! Keeps records at or above the given offset:
//!
//! ```sql
//! min-offset(1500)
//! ```

use sift_filter::*;

fn validate(params: &[Value]) -> Result<(), FilterError> {
    match params {
        [Value::Number(n)] if n.is_i64() => Ok(()),
        [other] => Err(FilterError::validation(format!(
            "min-offset expects argument 1 to be an integer, found {other}"
        ))),
        _ => Err(FilterError::validation(format!(
            "min-offset expects exactly 1 integer argument, found {} arguments",
            params.len()
        ))),
    }
}

fn matches(input: &FilterInput) -> Result<MatchResult, FilterError> {
    let floor = input
        .params
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| FilterError::runtime("min-offset evaluated without its integer argument"))?;
    Ok((input.record.offset >= floor).into())
}

export_filter!(validate, matches);
