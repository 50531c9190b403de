//! Tokens command implementation.
//!
//! Shows how an expression is split into tokens, with positions.

use super::{CommandContext, Result};
use crate::output::{format_tokens_json, format_tokens_table};

/// Options for the tokens command.
#[derive(Debug)]
pub struct TokensOptions {
    /// Expression to tokenize.
    pub expression: String,
    /// Keep whitespace tokens in the output.
    pub keep_whitespace: bool,
}

/// Executes the tokens command.
///
/// # Errors
///
/// Returns an error if the expression contains an unterminated string.
pub fn execute(ctx: &CommandContext, opts: &TokensOptions) -> Result<()> {
    let cursor = lee_core::tokenize(&opts.expression, !opts.keep_whitespace)?;
    tracing::info!(tokens = cursor.len(), "tokenized expression");

    if ctx.json_output {
        println!("{}", format_tokens_json(&cursor)?);
    } else if !ctx.quiet {
        print!("{}", format_tokens_table(&cursor, ctx.use_colors));
    }

    Ok(())
}
