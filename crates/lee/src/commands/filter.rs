//! Filter command implementation.
//!
//! Reads JSON records from a file or stdin and prints those matching an
//! expression.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use lee_core::CompiledExpression;

use super::config::Config;
use super::{CommandContext, CommandError, Result};
use crate::cli::FieldSpec;
use crate::output::{format_count, format_count_json, format_records, format_records_json};
use crate::records::{Record, RecordCompiler};

/// Options for the filter command.
#[derive(Debug)]
pub struct FilterOptions {
    /// Filter expression.
    pub expression: String,
    /// Input file (stdin when absent).
    pub input: Option<PathBuf>,
    /// Field types declared on the command line.
    pub fields: Vec<FieldSpec>,
    /// Case-insensitive regex matching.
    pub ignore_case: bool,
    /// Stop after this many matches.
    pub limit: Option<usize>,
    /// Print the number of matches only.
    pub count: bool,
}

/// Executes the filter command.
///
/// The expression is compiled before any input is read, so a bad expression
/// fails without consuming stdin.
///
/// # Errors
///
/// Returns an error if the expression is invalid for the declared fields, the
/// input cannot be read, or a record is not valid JSON.
pub fn execute(ctx: &CommandContext, opts: &FilterOptions, config: &Config) -> Result<()> {
    let compiler = build_compiler(opts, config);
    tracing::debug!(fields = compiler.fields().len(), "declared record fields");
    let expr = lee_core::parse(&opts.expression)?;
    let compiled = expr.compile(|condition| compiler.compile(condition))?;

    let text = read_input(opts.input.as_deref())?;
    let records = parse_records(&text)?;
    tracing::info!(records = records.len(), "read input records");

    let matched = select(&compiled, &records, opts.limit);
    tracing::info!(matched = matched.len(), "filtered records");

    if opts.count {
        if ctx.json_output {
            println!("{}", format_count_json(matched.len())?);
        } else if !ctx.quiet {
            print!("{}", format_count(matched.len(), ctx.use_colors));
        }
    } else if ctx.json_output {
        println!("{}", format_records_json(&matched)?);
    } else if !ctx.quiet {
        let pretty = config.output.pretty.unwrap_or(false);
        print!("{}", format_records(&matched, pretty)?);
    }

    Ok(())
}

/// Combines config and command-line settings. Command-line fields win.
fn build_compiler(opts: &FilterOptions, config: &Config) -> RecordCompiler {
    let case_insensitive = opts.ignore_case || config.filter.case_insensitive.unwrap_or(false);
    RecordCompiler::new()
        .with_fields(config.fields.iter().map(|(name, t)| (name.clone(), *t)))
        .with_fields(opts.fields.iter().map(|f| (f.name.clone(), f.field_type)))
        .case_insensitive(case_insensitive)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading records");
            fs::read_to_string(path).map_err(|e| {
                CommandError::Io(io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
            })
        }
        None => {
            tracing::debug!("reading records from stdin");
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Parses a JSON array of records, or one JSON record per line.
///
/// Blank lines in JSON-lines input are skipped.
fn parse_records(text: &str) -> Result<Vec<Record>> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| CommandError::Input(format!("invalid JSON array: {}", e)));
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| CommandError::Input(format!("line {}: {}", idx + 1, e)))
        })
        .collect()
}

/// Returns matching records in input order, stopping after `limit` matches.
fn select<'a>(
    compiled: &CompiledExpression<Record>,
    records: &'a [Record],
    limit: Option<usize>,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| compiled.evaluate(record))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
