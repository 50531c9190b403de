//! Parsed expression output formatting.

use lee_core::{Condition, Expression, Operand, Value};
use serde::Serialize;

use super::helpers::{format_header, format_position, paint_token};

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct ExpressionOutput<'a> {
    /// Canonical source form.
    pub expression: String,
    pub tree: TreeOutput<'a>,
    pub conditions: Vec<ConditionOutput<'a>>,
}

/// JSON output structure for an expression chain.
///
/// `ops[i]` joins `operands[i]` to the rest of the chain, which starts at
/// `operands[i + 1]`.
#[derive(Serialize)]
pub struct TreeOutput<'a> {
    pub operands: Vec<OperandOutput<'a>>,
    pub ops: Vec<&'static str>,
}

/// JSON output structure for an operand.
#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandOutput<'a> {
    Condition(ConditionOutput<'a>),
    Group(TreeOutput<'a>),
}

/// JSON output structure for a condition.
#[derive(Serialize)]
pub struct ConditionOutput<'a> {
    pub field: &'a str,
    pub op: &'static str,
    pub value: LiteralOutput,
    pub line: usize,
    pub column: usize,
}

/// JSON literal: a number, or the unquoted string contents.
#[derive(Serialize)]
#[serde(untagged)]
pub enum LiteralOutput {
    Number(f64),
    String(String),
}

fn condition_output(condition: &Condition) -> ConditionOutput<'_> {
    let value = match condition.value() {
        Value::Number(n) => LiteralOutput::Number(*n),
        Value::String(raw) => {
            LiteralOutput::String(condition.value().unquoted().unwrap_or_else(|_| raw.clone()))
        }
    };
    ConditionOutput {
        field: condition.name(),
        op: condition.op().symbol(),
        value,
        line: condition.identifier.token.line,
        column: condition.identifier.token.column,
    }
}

fn tree_output(expr: &Expression) -> TreeOutput<'_> {
    let mut tree = TreeOutput {
        operands: Vec::new(),
        ops: Vec::new(),
    };
    let mut expr = expr;
    loop {
        tree.operands.push(match &expr.left {
            Operand::Condition(condition) => OperandOutput::Condition(condition_output(condition)),
            Operand::Grouping(inner) => OperandOutput::Group(tree_output(inner)),
        });
        match &expr.right {
            Some((operator, right)) => {
                tree.ops.push(operator.op.as_str());
                expr = &**right;
            }
            None => return tree,
        }
    }
}

/// Formats a parsed expression as JSON.
pub fn format_expression_json(expr: &Expression) -> Result<String, serde_json::Error> {
    let output = ExpressionOutput {
        expression: expr.to_string(),
        tree: tree_output(expr),
        conditions: expr.conditions().into_iter().map(condition_output).collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats a parsed expression as its canonical form followed by its conditions.
pub fn format_expression_table(expr: &Expression, use_colors: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", format_header("Expression", use_colors)));
    output.push_str(&format!("  {expr}\n\n"));

    let conditions = expr.conditions();
    output.push_str(&format!(
        "{} ({})\n",
        format_header("Conditions", use_colors),
        conditions.len()
    ));
    for condition in conditions {
        let position = format_position(
            condition.identifier.token.line,
            condition.identifier.token.column,
        );
        output.push_str(&format!(
            "  {:<7} {} {} {}\n",
            position,
            paint_token(condition.identifier.token.kind, condition.name(), use_colors),
            paint_token(
                condition.operator.token.kind,
                condition.op().symbol(),
                use_colors
            ),
            paint_token(
                condition.literal.token.kind,
                &condition.literal.token.literal,
                use_colors
            ),
        ));
    }

    output
}
