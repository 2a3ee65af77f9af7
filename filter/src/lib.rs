//! Sift WASM Filter SDK
//!
//! This SDK provides the tools to write record filters that run inside the
//! sift sandbox. A filter is two pure functions — a parameter validator and
//! a record matcher — exported as the `validate_parameters` and `evaluate`
//! entry points via [`export_filter!`]. The SDK owns all ABI marshaling, so
//! filter code only ever sees decoded [`FilterInput`] and typed errors.

pub use serde_json::Value;
pub use sift_shared::{codec, FilterError, FilterInput, MatchResult, Record};

#[cfg(target_arch = "wasm32")]
pub mod abi;
pub mod entry;

/// Export the two filter entry points.
///
/// Takes the paths of a validator `fn(&[Value]) -> Result<(), FilterError>`
/// and a matcher `fn(&FilterInput) -> Result<MatchResult, FilterError>`,
/// and generates the `validate_parameters` / `evaluate` WASM exports around
/// them. Each export returns status 0 on success and 1 on failure, handing
/// the payload or the failure message back through the host's sink imports.
///
/// # Example
/// ```ignore
/// use sift_filter::*;
///
/// fn validate(params: &[Value]) -> Result<(), FilterError> {
///     match params {
///         [Value::String(_)] => Ok(()),
///         _ => Err(FilterError::validation("expected one string argument")),
///     }
/// }
///
/// fn matches(input: &FilterInput) -> Result<MatchResult, FilterError> {
///     Ok(input.record.topic.starts_with("orders").into())
/// }
///
/// export_filter!(validate, matches);
/// ```
#[macro_export]
macro_rules! export_filter {
    ($validate:path, $matches:path) => {
        #[cfg(target_arch = "wasm32")]
        #[no_mangle]
        pub extern "C" fn validate_parameters(ptr: u32, len: u32) -> u32 {
            let payload = unsafe { $crate::abi::input_slice(ptr, len) };
            match $crate::entry::run_validate(payload, $validate) {
                Ok(()) => 0,
                Err(err) => {
                    $crate::abi::set_error(&err.to_string());
                    1
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        #[no_mangle]
        pub extern "C" fn evaluate(ptr: u32, len: u32) -> u32 {
            let payload = unsafe { $crate::abi::input_slice(ptr, len) };
            match $crate::entry::run_evaluate(payload, $matches) {
                Ok(result) => {
                    $crate::abi::set_output(&result);
                    0
                }
                Err(err) => {
                    $crate::abi::set_error(&err.to_string());
                    1
                }
            }
        }
    };
}
