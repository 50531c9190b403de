//! Filter expression engine.
//!
//! Turns a textual boolean query such as
//! `altitude > 3000 and callsign =~ "DLH.*"` into a predicate that can be
//! evaluated many times against in-memory records.
//!
//! The pipeline runs strictly forward:
//!
//! 1. [`Lexer`] turns text into [`Token`]s (whitespace included).
//! 2. [`TokenCursor`] walks the tokens, optionally without whitespace.
//! 3. [`Parser`] builds an [`Expression`] tree.
//! 4. [`Expression::compile`] binds every [`Condition`] to an application
//!    predicate, producing a [`CompiledExpression`].
//! 5. [`CompiledExpression::evaluate`] runs it against a model with
//!    short-circuiting `and`/`or`.
//!
//! # Supported Syntax
//!
//! - Conditions: `field = 1`, `field != "x"`, `field =~ "re.*"`,
//!   `field !~ 're'`, `field < 1`, `field <= 1`, `field > 1`, `field >= 1`
//! - Combining: `and`/`&&`, `or`/`||` (case-insensitive keywords, equal
//!   precedence, chained to the right)
//! - Grouping: `( ... )`, nested up to [`MAX_GROUPING_DEPTH`] levels
//!
//! # Example
//!
//! ```
//! use lee_core::{parse, CompareOp, ExprError, Predicate};
//!
//! let expr = parse("len > 3 and len < 10").unwrap();
//! let compiled = expr
//!     .compile(|condition| -> Result<Predicate<String>, ExprError> {
//!         let n = condition.value().as_number()? as usize;
//!         match condition.op() {
//!             CompareOp::Greater => Ok(Box::new(move |s: &String| s.len() > n)),
//!             CompareOp::Less => Ok(Box::new(move |s: &String| s.len() < n)),
//!             _ => Err(ExprError::condition(condition, "unsupported operator")),
//!         }
//!     })
//!     .unwrap();
//!
//! assert!(compiled.evaluate(&"hello".to_string()));
//! assert!(!compiled.evaluate(&"hi".to_string()));
//! ```

mod ast;
mod cursor;
mod error;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{
    CombineOp, CombineOperator, CompareOp, Condition, Expression, Identifier, Literal, Operand,
    Operator, Value, ValueKind,
};
pub use cursor::TokenCursor;
pub use error::{ExprError, ExprResult};
pub use evaluator::{CompiledCondition, CompiledExpression, Predicate};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, MAX_GROUPING_DEPTH};

/// Tokenizes `text` and wraps the tokens in a cursor.
///
/// With `skip_whitespace` set, whitespace tokens are dropped from the cursor;
/// positions of the remaining tokens are unaffected.
///
/// # Errors
///
/// Returns [`ExprError::UnterminatedString`] if `text` ends inside a string
/// literal. Unknown characters are not errors; they become
/// [`TokenKind::Illegal`] tokens.
pub fn tokenize(text: &str, skip_whitespace: bool) -> ExprResult<TokenCursor> {
    let tokens = Lexer::new(text).tokenize()?;
    Ok(TokenCursor::new(tokens, skip_whitespace))
}

/// Tokenizes and parses `text` in one step.
///
/// # Errors
///
/// Returns any tokenizer or parser error; see [`tokenize`] and
/// [`Parser::parse`].
pub fn parse(text: &str) -> ExprResult<Expression> {
    let mut tokens = tokenize(text, true)?;
    Parser::new(&mut tokens).parse()
}

impl std::str::FromStr for Expression {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod evaluator_tests;
