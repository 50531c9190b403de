//! Error types for tokenizing, parsing and compiling expressions.

use thiserror::Error;

use crate::ast::{Condition, ValueKind};
use crate::lexer::{Token, TokenKind};

/// A specialized Result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors that can occur while turning text into a compiled expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExprError {
    /// The input ended inside a string literal. Aborts tokenization.
    #[error("unexpected end of input while reading a string started at line {line} pos {column}")]
    UnterminatedString {
        /// Line of the opening quote.
        line: usize,
        /// Column of the opening quote.
        column: usize,
    },

    /// A token of the wrong kind was found at a grammar position.
    #[error(
        "unexpected token {literal} ({kind}) at line {line} pos {column}{}",
        expected_suffix(.expected)
    )]
    UnexpectedToken {
        /// Source text of the offending token.
        literal: String,
        /// Kind of the offending token.
        kind: TokenKind,
        /// Line of the offending token.
        line: usize,
        /// Column of the offending token.
        column: usize,
        /// The kind the grammar required, when exactly one was acceptable.
        expected: Option<TokenKind>,
    },

    /// The input ended where a condition, operator or literal was required.
    #[error("unexpected end of input at line {line} pos {column}")]
    UnexpectedEndOfInput {
        /// Line of the end of input.
        line: usize,
        /// Column of the end of input.
        column: usize,
    },

    /// A grouping was opened but never closed.
    #[error("unclosed parenthesis opened at line {line} pos {column}")]
    UnclosedParenthesis {
        /// Line of the opening brace.
        line: usize,
        /// Column of the opening brace.
        column: usize,
    },

    /// Parentheses were nested deeper than the parser allows.
    #[error("parentheses nested deeper than {max} levels at line {line} pos {column}")]
    NestingTooDeep {
        /// The deepest nesting accepted.
        max: usize,
        /// Line of the first `(` past the limit.
        line: usize,
        /// Column of the first `(` past the limit.
        column: usize,
    },

    /// A numeric literal could not be represented as a finite `f64`.
    #[error("invalid number {literal} at line {line} pos {column}")]
    InvalidNumber {
        /// Source text of the number.
        literal: String,
        /// Line of the number.
        line: usize,
        /// Column of the number.
        column: usize,
    },

    /// A compile callback rejected a condition.
    #[error("{message}: {literal} ({kind}) at line {line} pos {column}")]
    Condition {
        /// What was wrong with the condition.
        message: String,
        /// Source text of the condition's identifier.
        literal: String,
        /// Kind of the identifier token.
        kind: TokenKind,
        /// Line of the identifier.
        line: usize,
        /// Column of the identifier.
        column: usize,
    },

    /// A value accessor was called for the variant the value does not hold.
    #[error("value is a {found}, not a {expected}")]
    WrongValueKind {
        /// The variant that was requested.
        expected: ValueKind,
        /// The variant the value holds.
        found: ValueKind,
    },
}

fn expected_suffix(expected: &Option<TokenKind>) -> String {
    match expected {
        Some(kind) => format!(", expected {kind}"),
        None => String::new(),
    }
}

impl ExprError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: &Token) -> Self {
        ExprError::UnexpectedToken {
            literal: token.literal.clone(),
            kind: token.kind,
            line: token.line,
            column: token.column,
            expected: None,
        }
    }

    /// Creates an unexpected token error that names the required kind.
    pub fn expected_token(token: &Token, expected: TokenKind) -> Self {
        ExprError::UnexpectedToken {
            literal: token.literal.clone(),
            kind: token.kind,
            line: token.line,
            column: token.column,
            expected: Some(expected),
        }
    }

    /// Creates a compile error for a condition, positioned at its identifier.
    ///
    /// Compile callbacks use this to reject unknown fields or operators that
    /// make no sense for a field.
    pub fn condition(condition: &Condition, message: impl Into<String>) -> Self {
        let token = &condition.identifier.token;
        ExprError::Condition {
            message: message.into(),
            literal: token.literal.clone(),
            kind: token.kind,
            line: token.line,
            column: token.column,
        }
    }

    /// Returns the `(line, column)` the error points at, if it has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ExprError::UnterminatedString { line, column }
            | ExprError::UnexpectedToken { line, column, .. }
            | ExprError::UnexpectedEndOfInput { line, column }
            | ExprError::UnclosedParenthesis { line, column }
            | ExprError::NestingTooDeep { line, column, .. }
            | ExprError::InvalidNumber { line, column, .. }
            | ExprError::Condition { line, column, .. } => Some((*line, *column)),
            ExprError::WrongValueKind { .. } => None,
        }
    }
}
