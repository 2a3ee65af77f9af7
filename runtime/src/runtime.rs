//! wasmtime-backed execution of filter modules.
//!
//! A filter module must export:
//!   - `memory` — linear memory
//!   - `alloc(size: u32) -> u32` / `dealloc(ptr: u32, size: u32)`
//!   - `validate_parameters(ptr: u32, len: u32) -> u32`
//!   - `evaluate(ptr: u32, len: u32) -> u32`
//!
//! Entry points return status 0 on success and 1 on failure. The success
//! payload and the failure message travel out-of-band through the
//! `env.output` and `env.error` imports; the host reads whichever side the
//! returned status selects.

use anyhow::{Context, Result};
use serde_json::Value;
use sift_shared::codec;
use sift_shared::{FilterError, FilterInput, MatchResult, Record};
use wasmtime::*;

/// Maximum WASM linear memory: 4 MB (64 pages of 64 KiB)
const MAX_MEMORY_PAGES: usize = 64;

/// Fuel limit per entry-point call (roughly ~10M instructions)
const FUEL_PER_CALL: u64 = 10_000_000;

/// Per-instance data threaded through the store: the sink the host imports
/// write into, plus the resource limiter.
struct CallState {
    output: Option<Vec<u8>>,
    error: Option<String>,
    limits: StoreLimits,
}

/// The two entry points every filter module exposes.
#[derive(Debug, Clone, Copy)]
enum EntryPoint {
    Validate,
    Evaluate,
}

impl EntryPoint {
    fn export(self) -> &'static str {
        match self {
            EntryPoint::Validate => "validate_parameters",
            EntryPoint::Evaluate => "evaluate",
        }
    }
}

/// Compiled filter module bound to one sandbox instance.
///
/// One instance is single-threaded and synchronous: each call runs to
/// completion before the next is issued. Run independent instances for
/// parallelism; nothing is shared between them.
pub struct LoadedFilter {
    store: Store<CallState>,
    memory: Memory,
    alloc_fn: TypedFunc<u32, u32>,
    dealloc_fn: TypedFunc<(u32, u32), ()>,
    validate_fn: TypedFunc<(u32, u32), u32>,
    evaluate_fn: TypedFunc<(u32, u32), u32>,
}

impl std::fmt::Debug for LoadedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFilter").finish_non_exhaustive()
    }
}

/// Runtime for loading and executing filter modules.
pub struct FilterRuntime {
    engine: Engine,
}

impl FilterRuntime {
    /// Create a new runtime with a security-hardened configuration.
    pub fn new() -> Result<Self> {
        let mut config = Config::new();
        config.consume_fuel(true);
        config.wasm_bulk_memory(true);
        config.wasm_multi_value(false);
        config.wasm_threads(false);

        let engine = Engine::new(&config).context("failed to create WASM engine")?;
        Ok(Self { engine })
    }

    /// Compile and instantiate a filter module.
    pub fn load_filter(&self, wasm_bytes: &[u8]) -> Result<LoadedFilter> {
        let module =
            Module::new(&self.engine, wasm_bytes).context("failed to compile WASM module")?;

        let mut store = Store::new(
            &self.engine,
            CallState {
                output: None,
                error: None,
                limits: StoreLimitsBuilder::new()
                    .memory_size(MAX_MEMORY_PAGES * 64 * 1024)
                    .memories(1)
                    .build(),
            },
        );
        store.limiter(|state| &mut state.limits);
        store.set_fuel(FUEL_PER_CALL).ok();

        let mut linker: Linker<CallState> = Linker::new(&self.engine);
        link_host_imports(&mut linker)?;

        let instance = linker
            .instantiate(&mut store, &module)
            .context("failed to instantiate WASM module")?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .context("filter module must export a linear `memory`")?;
        let alloc_fn = instance
            .get_typed_func::<u32, u32>(&mut store, "alloc")
            .context("filter module must export `alloc(size: u32) -> u32`")?;
        let dealloc_fn = instance
            .get_typed_func::<(u32, u32), ()>(&mut store, "dealloc")
            .context("filter module must export `dealloc(ptr: u32, size: u32)`")?;
        let validate_fn = instance
            .get_typed_func::<(u32, u32), u32>(&mut store, "validate_parameters")
            .context("filter module must export `validate_parameters(ptr: u32, len: u32) -> u32`")?;
        let evaluate_fn = instance
            .get_typed_func::<(u32, u32), u32>(&mut store, "evaluate")
            .context("filter module must export `evaluate(ptr: u32, len: u32) -> u32`")?;

        tracing::debug!(size = wasm_bytes.len(), "filter module loaded");

        Ok(LoadedFilter {
            store,
            memory,
            alloc_fn,
            dealloc_fn,
            validate_fn,
            evaluate_fn,
        })
    }
}

/// Wire up the `env` imports a filter may call during an entry point:
/// `output` and `error` fill the call sink, `log` goes to tracing.
fn link_host_imports(linker: &mut Linker<CallState>) -> Result<()> {
    linker.func_wrap(
        "env",
        "output",
        |mut caller: Caller<'_, CallState>, ptr: u32, len: u32| -> Result<()> {
            let bytes = read_guest_bytes(&mut caller, ptr, len)?;
            caller.data_mut().output = Some(bytes);
            Ok(())
        },
    )?;
    linker.func_wrap(
        "env",
        "error",
        |mut caller: Caller<'_, CallState>, ptr: u32, len: u32| -> Result<()> {
            let bytes = read_guest_bytes(&mut caller, ptr, len)?;
            caller.data_mut().error = Some(String::from_utf8_lossy(&bytes).into_owned());
            Ok(())
        },
    )?;
    linker.func_wrap(
        "env",
        "log",
        |mut caller: Caller<'_, CallState>, ptr: u32, len: u32| -> Result<()> {
            let bytes = read_guest_bytes(&mut caller, ptr, len)?;
            tracing::debug!(target: "sift::filter", "{}", String::from_utf8_lossy(&bytes));
            Ok(())
        },
    )?;
    Ok(())
}

/// Copy `len` bytes out of the guest's exported memory at `ptr`.
fn read_guest_bytes(caller: &mut Caller<'_, CallState>, ptr: u32, len: u32) -> Result<Vec<u8>> {
    let memory = caller
        .get_export("memory")
        .and_then(|e| e.into_memory())
        .context("filter module has no exported memory")?;
    let data = memory.data(caller.as_context());
    let start = ptr as usize;
    let end = start
        .checked_add(len as usize)
        .context("guest pointer overflows")?;
    let bytes = data
        .get(start..end)
        .context("guest pointer out of bounds")?
        .to_vec();
    Ok(bytes)
}

impl LoadedFilter {
    /// Validate a parameter list, once per query compilation.
    ///
    /// A rejection carries the filter's message verbatim as
    /// [`FilterError::Validation`] so it can be shown to the user as-is.
    pub fn validate_parameters(&mut self, params: &[Value]) -> Result<(), FilterError> {
        let payload = codec::encode_params(params)?;
        self.call(EntryPoint::Validate, &payload)?;
        Ok(())
    }

    /// Evaluate one record against an already-validated parameter list.
    ///
    /// A status-0 return with no decodable [`MatchResult`] payload is a
    /// [`FilterError::Decode`], never a default non-match.
    pub fn evaluate(&mut self, input: &FilterInput) -> Result<MatchResult, FilterError> {
        let payload = codec::encode_input(input)?;
        let output = self.call(EntryPoint::Evaluate, &payload)?;
        codec::decode_result(&output)
    }

    /// Evaluate one record, building the [`FilterInput`] from parts.
    pub fn matches(&mut self, record: &Record, params: &[Value]) -> Result<bool, FilterError> {
        let input = FilterInput {
            record: record.clone(),
            params: params.to_vec(),
        };
        Ok(self.evaluate(&input)?.matched)
    }

    /// Filter a batch of records, keeping those the filter matches.
    /// The first failing evaluation aborts the batch.
    pub fn filter_records(
        &mut self,
        records: Vec<Record>,
        params: &[Value],
    ) -> Result<Vec<Record>, FilterError> {
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if self.matches(&record, params)? {
                kept.push(record);
            }
        }
        Ok(kept)
    }

    /// Invoke one entry point: write the payload into guest memory, call,
    /// then read back the sink the status code selects.
    fn call(&mut self, entry: EntryPoint, payload: &[u8]) -> Result<Vec<u8>, FilterError> {
        // Fresh fuel and a clean sink for this invocation
        self.store.set_fuel(FUEL_PER_CALL).ok();
        self.store.data_mut().output = None;
        self.store.data_mut().error = None;

        let len = payload.len() as u32;
        let ptr = self
            .alloc_fn
            .call(&mut self.store, len)
            .map_err(|e| sandbox_failure(entry, e))?;

        let memory_len = self.memory.data_size(&self.store);
        let start = ptr as usize;
        let end = start.checked_add(payload.len());
        if ptr == 0 || !end.is_some_and(|end| end <= memory_len) {
            return Err(FilterError::Runtime(format!(
                "filter allocator returned an out-of-bounds buffer (ptr {ptr}, len {len})"
            )));
        }
        self.memory.data_mut(&mut self.store)[start..start + payload.len()]
            .copy_from_slice(payload);

        let entry_fn = match entry {
            EntryPoint::Validate => self.validate_fn,
            EntryPoint::Evaluate => self.evaluate_fn,
        };
        let status = entry_fn
            .call(&mut self.store, (ptr, len))
            .map_err(|e| sandbox_failure(entry, e))?;

        // Give the input buffer back regardless of the outcome
        self.dealloc_fn.call(&mut self.store, (ptr, len)).ok();

        match status {
            0 => Ok(self.store.data_mut().output.take().unwrap_or_default()),
            _ => {
                let message = self
                    .store
                    .data_mut()
                    .error
                    .take()
                    .unwrap_or_else(|| "filter reported a failure with no message".to_string());
                Err(match entry {
                    EntryPoint::Validate => FilterError::Validation(message),
                    EntryPoint::Evaluate => FilterError::Runtime(message),
                })
            }
        }
    }
}

/// A trap, fuel exhaustion, or limiter rejection inside an entry point.
fn sandbox_failure(entry: EntryPoint, err: anyhow::Error) -> FilterError {
    FilterError::Runtime(format!("{} failed in the sandbox: {err:#}", entry.export()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_creation() {
        let runtime = FilterRuntime::new().unwrap();
        drop(runtime);
    }

    #[test]
    fn rejects_a_module_without_the_entry_points() {
        let runtime = FilterRuntime::new().unwrap();
        let err = runtime
            .load_filter(b"(module (memory (export \"memory\") 1))")
            .unwrap_err();
        assert!(format!("{err:#}").contains("must export"));
    }

    // Full host/guest round trips live in tests/host_contract.rs, driven
    // by stub modules written in WAT.
}
