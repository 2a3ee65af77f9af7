//! Contract errors crossing the filter boundary

use thiserror::Error;

/// Failure kinds a filter call can report.
///
/// `Validation` is raised at query-compilation time; its message describes
/// the expected argument shape and is surfaced verbatim to the end user.
/// `Decode` and `Runtime` are call-time failures: a payload that could not
/// be unmarshaled, or a contract violation such as evaluating against a
/// parameter list that never passed validation. None of them may be
/// collapsed into a default non-match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The user-supplied parameter list does not fit the filter
    #[error("{0}")]
    Validation(String),

    /// A boundary payload could not be decoded
    #[error("malformed filter payload: {0}")]
    Decode(String),

    /// The filter was invoked in an invalid state
    #[error("{0}")]
    Runtime(String),
}

impl FilterError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}
