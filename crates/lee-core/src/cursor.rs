//! Replayable read-only view over a token sequence.

use crate::lexer::{Token, TokenKind};

/// A cursor over a token sequence.
///
/// The index only moves forward, one token per [`advance`](Self::advance), or
/// back to the start with [`reset`](Self::reset). Reads never move it and
/// return `None` past the end instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    idx: usize,
}

impl TokenCursor {
    /// Builds a cursor, dropping whitespace tokens if `skip_whitespace` is set.
    pub fn new(tokens: Vec<Token>, skip_whitespace: bool) -> Self {
        let tokens = if skip_whitespace {
            tokens
                .into_iter()
                .filter(|t| t.kind != TokenKind::WhiteSpace)
                .collect()
        } else {
            tokens
        };
        Self { tokens, idx: 0 }
    }

    /// Moves the cursor back to the first token.
    pub fn reset(&mut self) {
        self.idx = 0;
    }

    /// Returns the token under the cursor.
    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.idx)
    }

    /// Returns the token after the current one, for lookahead.
    pub fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.idx + 1)
    }

    /// Moves the cursor one token forward. Moving past the end is allowed.
    pub fn advance(&mut self) {
        self.idx = self.idx.saturating_add(1);
    }

    /// Returns the last token of the sequence (normally EOF).
    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// Returns the whole sequence the cursor walks over.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the number of tokens in the sequence.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the sequence holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> IntoIterator for &'a TokenCursor {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
