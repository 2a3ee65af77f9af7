//! WASM Filter Runtime
//!
//! Loads compiled filter modules and drives the two-entry-point contract:
//! `validate_parameters` once per query compilation, `evaluate` once per
//! candidate record. Modules run sandboxed — metered fuel, bounded linear
//! memory, and no ambient host access beyond the output/error/log imports.

pub mod runtime;

pub use runtime::{FilterRuntime, LoadedFilter};
