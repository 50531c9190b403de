//! Recursive descent parser for filter expressions.

use crate::ast::{
    CombineOp, CombineOperator, CompareOp, Condition, Expression, Identifier, Literal, Operand,
    Operator, Value,
};
use crate::cursor::TokenCursor;
use crate::error::{ExprError, ExprResult};
use crate::lexer::{Token, TokenKind};

/// Deepest grouping nesting the parser accepts.
pub const MAX_GROUPING_DEPTH: usize = 128;

/// Parser for filter expressions.
///
/// The current token is the only lookahead and drives every decision; there
/// is no backtracking and no error recovery.
///
/// # Grammar
///
/// ```text
/// expression ::= left_expr ( combine_op expression )?
/// left_expr  ::= condition | "(" expression ")"
/// condition  ::= identifier compare_op ( string | number )
/// combine_op ::= "and" | "or" | "&&" | "||"
/// compare_op ::= "=" | "!=" | "=~" | "!~" | "<" | "<=" | ">" | ">="
/// ```
///
/// AND and OR have the same precedence and chain to the right:
/// `a or b and c` is `a or (b and c)`. Chains are read in a loop; only
/// groupings recurse, up to [`MAX_GROUPING_DEPTH`] levels.
///
/// # Example
///
/// ```
/// use lee_core::{tokenize, Parser};
///
/// let mut tokens = tokenize("altitude > 3000 and callsign =~ \"DLH.*\"", true).unwrap();
/// let expr = Parser::new(&mut tokens).parse().unwrap();
/// assert_eq!(expr.conditions().len(), 2);
/// ```
pub struct Parser<'c> {
    tokens: &'c mut TokenCursor,
}

impl<'c> Parser<'c> {
    /// Creates a parser reading from the cursor's current position.
    pub fn new(tokens: &'c mut TokenCursor) -> Self {
        Self { tokens }
    }

    /// Parses a complete expression, which must be followed by end of input.
    ///
    /// # Errors
    ///
    /// Returns `ExprError::UnexpectedToken` for a token that does not fit the
    /// grammar (including illegal tokens and a stray `)`),
    /// `ExprError::UnexpectedEndOfInput` if the input stops early,
    /// `ExprError::UnclosedParenthesis` for a missing `)`,
    /// `ExprError::NestingTooDeep` past [`MAX_GROUPING_DEPTH`] and
    /// `ExprError::InvalidNumber` for an out-of-range numeral.
    pub fn parse(mut self) -> ExprResult<Expression> {
        let expr = self.parse_expression(0)?;
        let token = self.current()?;
        if token.kind != TokenKind::Eof {
            return Err(ExprError::unexpected_token(&token));
        }
        tracing::debug!(expression = %expr, "parsed expression");
        Ok(expr)
    }

    /// Returns a copy of the current token.
    fn current(&self) -> ExprResult<Token> {
        match self.tokens.current() {
            Some(token) => Ok(token.clone()),
            None => {
                let (line, column) = self
                    .tokens
                    .last()
                    .map(|t| (t.line, t.column))
                    .unwrap_or((1, 1));
                Err(ExprError::UnexpectedEndOfInput { line, column })
            }
        }
    }

    fn parse_combine_operator(&mut self) -> ExprResult<CombineOperator> {
        let token = self.current()?;
        let Some(op) = CombineOp::from_token_kind(token.kind) else {
            return Err(unexpected(&token));
        };
        self.tokens.advance();
        Ok(CombineOperator { op, token })
    }

    fn parse_grouping(&mut self, open: Token, depth: usize) -> ExprResult<Expression> {
        if depth > MAX_GROUPING_DEPTH {
            return Err(ExprError::NestingTooDeep {
                max: MAX_GROUPING_DEPTH,
                line: open.line,
                column: open.column,
            });
        }
        self.tokens.advance();

        let expr = self.parse_expression(depth)?;

        // parse_expression stops only at EOF or `)`.
        if self.current()?.kind == TokenKind::Eof {
            return Err(ExprError::UnclosedParenthesis {
                line: open.line,
                column: open.column,
            });
        }
        self.tokens.advance();
        Ok(expr)
    }

    fn parse_operand(&mut self, depth: usize) -> ExprResult<Operand> {
        let token = self.current()?;
        match token.kind {
            TokenKind::LBrace => Ok(Operand::Grouping(Box::new(
                self.parse_grouping(token, depth + 1)?,
            ))),
            TokenKind::Identifier => Ok(Operand::Condition(self.parse_condition()?)),
            _ => Err(unexpected(&token)),
        }
    }

    fn parse_expression(&mut self, depth: usize) -> ExprResult<Expression> {
        let first = self.parse_operand(depth)?;
        let mut rest = Vec::new();
        loop {
            let token = self.current()?;
            match token.kind {
                TokenKind::Eof | TokenKind::RBrace => return Ok(Expression::chain(first, rest)),
                TokenKind::And | TokenKind::Or => {
                    let operator = self.parse_combine_operator()?;
                    let operand = self.parse_operand(depth)?;
                    rest.push((operator, operand));
                }
                _ => return Err(unexpected(&token)),
            }
        }
    }

    pub(crate) fn parse_condition(&mut self) -> ExprResult<Condition> {
        let token = self.current()?;
        if token.kind != TokenKind::Identifier {
            return Err(ExprError::expected_token(&token, TokenKind::Identifier));
        }
        self.tokens.advance();
        let identifier = Identifier {
            name: token.literal.clone(),
            token,
        };

        let token = self.current()?;
        let Some(op) = CompareOp::from_token_kind(token.kind) else {
            return Err(unexpected(&token));
        };
        self.tokens.advance();
        let operator = Operator { op, token };

        let token = self.current()?;
        let value = match token.kind {
            TokenKind::String => Value::String(token.literal.clone()),
            TokenKind::Number => Value::Number(parse_number(&token)?),
            _ => return Err(unexpected(&token)),
        };
        self.tokens.advance();

        Ok(Condition {
            identifier,
            operator,
            literal: Literal { value, token },
        })
    }
}

/// Builds the error for a token that cannot appear where it was found.
fn unexpected(token: &Token) -> ExprError {
    if token.kind == TokenKind::Eof {
        ExprError::UnexpectedEndOfInput {
            line: token.line,
            column: token.column,
        }
    } else {
        ExprError::unexpected_token(token)
    }
}

fn parse_number(token: &Token) -> ExprResult<f64> {
    match token.literal.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ExprError::InvalidNumber {
            literal: token.literal.clone(),
            line: token.line,
            column: token.column,
        }),
    }
}
