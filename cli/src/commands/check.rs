//! Check command implementation

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sift_runtime::FilterRuntime;

use crate::output;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the compiled filter module (.wasm)
    pub module: PathBuf,

    /// Filter parameter, repeatable; integers are passed as numbers
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let wasm = fs::read(&args.module)
        .with_context(|| format!("failed to read {}", args.module.display()))?;

    let runtime = FilterRuntime::new()?;
    let mut filter = runtime.load_filter(&wasm)?;
    output::success(&format!(
        "{} exposes the filter entry points",
        args.module.display()
    ));

    let params: Vec<_> = args.params.iter().map(|p| super::parse_param(p)).collect();
    match filter.validate_parameters(&params) {
        Ok(()) => {
            output::success("parameters accepted");
            Ok(())
        }
        Err(err) => {
            output::error(&err.to_string());
            std::process::exit(1);
        }
    }
}
