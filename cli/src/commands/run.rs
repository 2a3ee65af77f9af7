//! Run command implementation

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde_json::Value;
use sift_runtime::{FilterRuntime, LoadedFilter};
use sift_shared::Record;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the compiled filter module (.wasm)
    pub module: PathBuf,

    /// File with one JSON record per line
    #[arg(short, long)]
    pub records: PathBuf,

    /// Filter parameter, repeatable; integers are passed as numbers
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Output format for matching records
    #[arg(long, value_enum, default_value_t = Format::Plain)]
    pub format: Format,

    /// Stop after this many matches
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Log evaluation failures and keep consuming instead of aborting
    #[arg(long)]
    pub skip_errors: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Format {
    /// Human-readable one-line summary
    Plain,
    /// The matching record as one JSON object per line
    Json,
}

/// Counters for one pass over a record stream.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub matched: usize,
}

pub fn run(args: RunArgs) -> Result<()> {
    let wasm = fs::read(&args.module)
        .with_context(|| format!("failed to read {}", args.module.display()))?;

    let runtime = FilterRuntime::new()?;
    let mut filter = runtime.load_filter(&wasm)?;

    // Validate once, before any record is consumed.
    let params: Vec<_> = args.params.iter().map(|p| super::parse_param(p)).collect();
    filter.validate_parameters(&params)?;

    let file = File::open(&args.records)
        .with_context(|| format!("failed to open {}", args.records.display()))?;
    let summary = scan(
        &mut filter,
        BufReader::new(file),
        &params,
        args.limit,
        args.skip_errors,
        |record| print_match(record, args.format),
    )?;

    eprintln!(
        "{}",
        format!("{} of {} records matched", summary.matched, summary.scanned).dimmed()
    );
    Ok(())
}

/// Stream line-delimited JSON records through the filter.
///
/// With `skip_errors` a malformed line or a failing evaluation is logged
/// and the scan continues; otherwise the first failure aborts the stream.
fn scan<R: BufRead>(
    filter: &mut LoadedFilter,
    reader: R,
    params: &[Value],
    limit: Option<usize>,
    skip_errors: bool,
    mut on_match: impl FnMut(&Record) -> Result<()>,
) -> Result<ScanSummary> {
    let mut summary = ScanSummary::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(err) => {
                if skip_errors {
                    tracing::warn!("skipping malformed record on line {}: {err}", index + 1);
                    continue;
                }
                anyhow::bail!("malformed record on line {}: {err}", index + 1);
            }
        };
        summary.scanned += 1;
        match filter.matches(&record, params) {
            Ok(true) => {
                summary.matched += 1;
                on_match(&record)?;
                if limit.is_some_and(|limit| summary.matched >= limit) {
                    break;
                }
            }
            Ok(false) => {}
            Err(err) => {
                if skip_errors {
                    tracing::warn!("filter failed on line {}: {err}", index + 1);
                    continue;
                }
                return Err(err).with_context(|| format!("filter failed on line {}", index + 1));
            }
        }
    }
    Ok(summary)
}

fn print_match(record: &Record, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(record)?),
        Format::Plain => {
            let timestamp = record
                .timestamp_utc()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| record.timestamp.to_string());
            println!(
                "{} {} {}/{} {} {}",
                timestamp.dimmed(),
                record.topic.bold(),
                record.partition,
                record.offset,
                record.key.green(),
                record.value
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Stub module accepting any parameters and matching every record.
    const MATCH_ALL: &str = r#"(module
  (import "env" "output" (func $output (param i32 i32)))
  (import "env" "error" (func $error (param i32 i32)))
  (memory (export "memory") 1)
  (global $heap (mut i32) (i32.const 4096))
  (data (i32.const 16) "{\"match\":true}")
  (func (export "alloc") (param $size i32) (result i32)
    (local $ptr i32)
    (local.set $ptr (global.get $heap))
    (global.set $heap (i32.add (global.get $heap) (local.get $size)))
    (local.get $ptr))
  (func (export "dealloc") (param i32 i32))
  (func (export "validate_parameters") (param i32 i32) (result i32)
    (i32.const 0))
  (func (export "evaluate") (param i32 i32) (result i32)
    (call $output (i32.const 16) (i32.const 14))
    (i32.const 0)))"#;

    fn match_all_filter() -> LoadedFilter {
        let runtime = FilterRuntime::new().unwrap();
        runtime.load_filter(MATCH_ALL.as_bytes()).unwrap()
    }

    fn records_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    fn record_line(key: &str) -> String {
        json!({
            "value": "v",
            "key": key,
            "topic": "orders",
            "timestamp": 0,
            "partition": 0,
            "offset": 0,
            "headers": {}
        })
        .to_string()
    }

    #[test]
    fn scan_counts_scanned_and_matched_records() {
        let mut filter = match_all_filter();
        let file = records_file(&[&record_line("a"), "", &record_line("b")]);
        let reader = BufReader::new(File::open(file.path()).unwrap());

        let mut keys = Vec::new();
        let summary = scan(&mut filter, reader, &[], None, false, |record| {
            keys.push(record.key.clone());
            Ok(())
        })
        .unwrap();

        assert_eq!(summary, ScanSummary { scanned: 2, matched: 2 });
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn limit_stops_the_scan_early() {
        let mut filter = match_all_filter();
        let file = records_file(&[&record_line("a"), &record_line("b")]);
        let reader = BufReader::new(File::open(file.path()).unwrap());

        let summary = scan(&mut filter, reader, &[], Some(1), false, |_| Ok(())).unwrap();
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.scanned, 1);
    }

    #[test]
    fn malformed_line_aborts_by_default() {
        let mut filter = match_all_filter();
        let file = records_file(&["{broken", &record_line("a")]);
        let reader = BufReader::new(File::open(file.path()).unwrap());

        let err = scan(&mut filter, reader, &[], None, false, |_| Ok(())).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn malformed_line_is_skipped_with_skip_errors() {
        let mut filter = match_all_filter();
        let file = records_file(&["{broken", &record_line("a")]);
        let reader = BufReader::new(File::open(file.path()).unwrap());

        let summary = scan(&mut filter, reader, &[], None, true, |_| Ok(())).unwrap();
        assert_eq!(summary, ScanSummary { scanned: 1, matched: 1 });
    }
}
