//! Parse command implementation.
//!
//! Parses an expression and shows its canonical form and conditions.

use super::{CommandContext, Result};
use crate::output::{format_expression_json, format_expression_table};

/// Executes the parse command.
///
/// # Errors
///
/// Returns an error if the expression cannot be tokenized or parsed.
pub fn execute(ctx: &CommandContext, expression: &str) -> Result<()> {
    let expr = lee_core::parse(expression)?;
    tracing::info!(conditions = expr.conditions().len(), "parsed expression");

    if ctx.json_output {
        println!("{}", format_expression_json(&expr)?);
    } else if !ctx.quiet {
        print!("{}", format_expression_table(&expr, ctx.use_colors));
    }

    Ok(())
}
