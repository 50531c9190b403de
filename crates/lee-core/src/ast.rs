//! Abstract Syntax Tree (AST) for filter expressions.
//!
//! Every node keeps a copy of the token it was built from, so errors raised
//! long after parsing (for example by a compile callback) can still point at
//! the right line and column.

use std::fmt;

use crate::error::{ExprError, ExprResult};
use crate::lexer::{Token, TokenKind};

/// A comparison operator inside a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Equals,
    /// `!=`
    NotEquals,
    /// `=~`
    Matches,
    /// `!~`
    NotMatches,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl CompareOp {
    /// Maps a token kind to the comparison operator it spells, if any.
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Equals => Some(CompareOp::Equals),
            TokenKind::NotEquals => Some(CompareOp::NotEquals),
            TokenKind::Matches => Some(CompareOp::Matches),
            TokenKind::NotMatches => Some(CompareOp::NotMatches),
            TokenKind::Less => Some(CompareOp::Less),
            TokenKind::LessOrEqual => Some(CompareOp::LessOrEqual),
            TokenKind::Greater => Some(CompareOp::Greater),
            TokenKind::GreaterOrEqual => Some(CompareOp::GreaterOrEqual),
            _ => None,
        }
    }

    /// Returns the source symbol of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equals => "=",
            CompareOp::NotEquals => "!=",
            CompareOp::Matches => "=~",
            CompareOp::NotMatches => "!~",
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterOrEqual => ">=",
        }
    }

    /// Returns true for the ordering operators (`<`, `<=`, `>`, `>=`).
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            CompareOp::Less | CompareOp::LessOrEqual | CompareOp::Greater | CompareOp::GreaterOrEqual
        )
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An operator joining two expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombineOp {
    /// Logical AND (`and`, `&&`).
    And,
    /// Logical OR (`or`, `||`).
    Or,
}

impl CombineOp {
    /// Maps a token kind to the combine operator it spells, if any.
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::And => Some(CombineOp::And),
            TokenKind::Or => Some(CombineOp::Or),
            _ => None,
        }
    }
}

impl CombineOp {
    /// Returns the canonical keyword for the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            CombineOp::And => "and",
            CombineOp::Or => "or",
        }
    }
}

impl fmt::Display for CombineOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which variant a [`Value`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A quoted string literal.
    String,
    /// A numeric literal.
    Number,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => f.write_str("string"),
            ValueKind::Number => f.write_str("number"),
        }
    }
}

/// The literal on the right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The raw string literal, quotes and escapes included.
    String(String),
    /// A number parsed at parse time.
    Number(f64),
}

impl Value {
    /// Returns which variant the value holds.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
        }
    }

    /// Returns the raw string literal.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::WrongValueKind`] if the value is a number.
    pub fn as_str(&self) -> ExprResult<&str> {
        match self {
            Value::String(s) => Ok(s),
            Value::Number(_) => Err(ExprError::WrongValueKind {
                expected: ValueKind::String,
                found: ValueKind::Number,
            }),
        }
    }

    /// Returns the numeric payload.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::WrongValueKind`] if the value is a string.
    pub fn as_number(&self) -> ExprResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::String(_) => Err(ExprError::WrongValueKind {
                expected: ValueKind::Number,
                found: ValueKind::String,
            }),
        }
    }

    /// Returns the string contents without the surrounding quotes, with each
    /// `\x` escape replaced by `x`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::WrongValueKind`] if the value is a number.
    pub fn unquoted(&self) -> ExprResult<String> {
        let raw = self.as_str()?;
        let mut chars = raw.chars();
        let inner = match (chars.next(), chars.next_back()) {
            (Some(open @ ('"' | '\'')), Some(close)) if open == close => chars.as_str(),
            _ => raw,
        };

        let mut result = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            } else {
                result.push(c);
            }
        }
        Ok(result)
    }
}

/// The field name a condition tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The name, verbatim from source.
    pub name: String,
    /// The identifier token.
    pub token: Token,
}

/// A comparison operator with its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// The operator.
    pub op: CompareOp,
    /// The operator token.
    pub token: Token,
}

/// A literal value with its token.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The value.
    pub value: Value,
    /// The string or number token.
    pub token: Token,
}

/// An atomic predicate in source form: `identifier operator literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The field being tested.
    pub identifier: Identifier,
    /// How the field is compared.
    pub operator: Operator,
    /// What the field is compared against.
    pub literal: Literal,
}

impl Condition {
    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.identifier.name
    }

    /// Returns the comparison operator.
    pub fn op(&self) -> CompareOp {
        self.operator.op
    }

    /// Returns the literal value.
    pub fn value(&self) -> &Value {
        &self.literal.value
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.identifier.name, self.operator.op, self.literal.token.literal
        )
    }
}

/// A combine operator with its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineOperator {
    /// The operator.
    pub op: CombineOp,
    /// The `and`/`or`/`&&`/`||` token.
    pub token: Token,
}

/// The left-hand side of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single condition.
    Condition(Condition),
    /// A parenthesized sub-expression.
    Grouping(Box<Expression>),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Condition(condition) => fmt::Display::fmt(condition, f),
            Operand::Grouping(expr) => write!(f, "({expr})"),
        }
    }
}

/// A parsed filter expression.
///
/// An operand optionally followed by a combine operator and the rest of the
/// chain, so `a and b or c` is `a and (b or (c))`. AND and OR share one
/// precedence level.
///
/// Chains are walked with loops rather than recursion, so their length is
/// bounded by memory only. Nesting through groupings is capped by the parser.
#[derive(Debug)]
pub struct Expression {
    /// The left operand.
    pub left: Operand,
    /// The combine operator and right-hand expression, present as a pair.
    pub right: Option<(CombineOperator, Box<Expression>)>,
}

impl Expression {
    /// Builds the right-associated chain `first op1 (o1 op2 (o2 ...))`.
    pub(crate) fn chain(first: Operand, rest: Vec<(CombineOperator, Operand)>) -> Self {
        let mut links = rest.into_iter().rev();
        let Some((mut operator, last)) = links.next() else {
            return Expression {
                left: first,
                right: None,
            };
        };
        let mut tail = Expression {
            left: last,
            right: None,
        };
        for (previous, operand) in links {
            tail = Expression {
                left: operand,
                right: Some((operator, Box::new(tail))),
            };
            operator = previous;
        }
        Expression {
            left: first,
            right: Some((operator, Box::new(tail))),
        }
    }

    /// Returns the conditions in the order they are compiled and evaluated.
    pub fn conditions(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        let mut expr = self;
        loop {
            match &expr.left {
                Operand::Condition(condition) => out.push(condition),
                Operand::Grouping(inner) => inner.collect_conditions(out),
            }
            match &expr.right {
                Some((_, right)) => expr = &**right,
                None => break,
            }
        }
    }
}

impl Clone for Expression {
    fn clone(&self) -> Self {
        let mut rest = Vec::new();
        let mut expr = self;
        while let Some((operator, right)) = &expr.right {
            rest.push((operator.clone(), right.left.clone()));
            expr = &**right;
        }
        Expression::chain(self.left.clone(), rest)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            if a.left != b.left {
                return false;
            }
            match (&a.right, &b.right) {
                (Some((op_a, next_a)), Some((op_b, next_b))) if op_a == op_b => {
                    a = &**next_a;
                    b = &**next_b;
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

impl Drop for Expression {
    // Link by link; the default drop recurses once per link.
    fn drop(&mut self) {
        let mut next = self.right.take();
        while let Some((_, mut expr)) = next {
            next = expr.right.take();
        }
    }
}

impl fmt::Display for Expression {
    /// Renders the expression as parseable source text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut expr = self;
        loop {
            fmt::Display::fmt(&expr.left, f)?;
            match &expr.right {
                Some((operator, right)) => {
                    write!(f, " {} ", operator.op)?;
                    expr = &**right;
                }
                None => return Ok(()),
            }
        }
    }
}
