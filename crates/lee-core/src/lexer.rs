//! Lexer (tokenizer) for filter expressions.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ExprError, ExprResult};

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A character (or unfinished operator) the grammar has no use for.
    Illegal,
    /// End of input. Always the last token, with an empty literal.
    Eof,
    /// A run of whitespace characters.
    WhiteSpace,
    /// A field name: ASCII letter or `_`, then letters, digits or `_`.
    Identifier,
    /// Digits with at most one decimal point.
    Number,
    /// A single- or double-quoted string, quotes included.
    String,

    // ==================== Comparison Operators ====================
    /// `!=`
    NotEquals,
    /// `=`
    Equals,
    /// `=~`
    Matches,
    /// `!~`
    NotMatches,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessOrEqual,
    /// `>=`
    GreaterOrEqual,

    // ==================== Punctuation ====================
    /// `(`
    LBrace,
    /// `)`
    RBrace,

    // ==================== Combine Operators ====================
    /// `or` or `||`
    Or,
    /// `and` or `&&`
    And,
}

impl TokenKind {
    /// Returns the name used when rendering tokens and errors.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Illegal => "Illegal",
            TokenKind::Eof => "EOF",
            TokenKind::WhiteSpace => "WhiteSpace",
            TokenKind::Identifier => "Identifier",
            TokenKind::Number => "Number",
            TokenKind::String => "String",
            TokenKind::NotEquals => "NotEquals",
            TokenKind::Equals => "Equals",
            TokenKind::Matches => "Matches",
            TokenKind::NotMatches => "NotMatches",
            TokenKind::Less => "Less",
            TokenKind::Greater => "Greater",
            TokenKind::LessOrEqual => "LessOrEqual",
            TokenKind::GreaterOrEqual => "GreaterOrEqual",
            TokenKind::LBrace => "LBrace",
            TokenKind::RBrace => "RBrace",
            TokenKind::Or => "Or",
            TokenKind::And => "And",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token with the exact source text it was built from and its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of the token.
    pub kind: TokenKind,
    /// The source text consumed, casing and escapes preserved.
    pub literal: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character, counted in characters.
    pub column: usize,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Token type={} literal=\"{}\" at={}:{}>",
            self.kind,
            self.literal.replace('\n', "\\n"),
            self.line,
            self.column
        )
    }
}

/// Lexer for tokenizing filter expressions.
///
/// The lexer never fails on characters it does not understand: they become
/// [`TokenKind::Illegal`] tokens and are left for the parser to reject. The
/// only fatal condition is input ending inside a string literal.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current line (1-based).
    line: usize,
    /// Characters consumed on the current line.
    column: usize,
    /// Text of the token being read.
    literal: String,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 0,
            literal: String::new(),
            tokens: Vec::new(),
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consumes the next character into the current literal, updating line
    /// and column counters.
    fn eat(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.literal.push(c);
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consumes the next character only if it is `expected`.
    fn eat_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.eat();
            true
        } else {
            false
        }
    }

    /// Position the next token starts at.
    fn start(&self) -> (usize, usize) {
        (self.line, self.column + 1)
    }

    /// Pushes the current literal as a token.
    fn push(&mut self, kind: TokenKind, (line, column): (usize, usize)) {
        let literal = std::mem::take(&mut self.literal);
        self.tokens.push(Token {
            kind,
            literal,
            line,
            column,
        });
    }

    fn read_number(&mut self) {
        let start = self.start();
        let mut dot_found = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.eat();
            } else if c == '.' && !dot_found {
                dot_found = true;
                self.eat();
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start);
    }

    fn read_whitespace(&mut self) {
        let start = self.start();
        while self.peek().is_some_and(char::is_whitespace) {
            self.eat();
        }
        self.push(TokenKind::WhiteSpace, start);
    }

    fn read_identifier(&mut self) {
        let start = self.start();
        while self.peek().is_some_and(is_ident_char) {
            self.eat();
        }
        let kind = match self.literal.to_ascii_lowercase().as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            _ => TokenKind::Identifier,
        };
        self.push(kind, start);
    }

    /// Reads `=` or `=~`.
    fn read_equals_or_matches(&mut self) {
        let start = self.start();
        self.eat();
        let kind = if self.eat_if('~') {
            TokenKind::Matches
        } else {
            TokenKind::Equals
        };
        self.push(kind, start);
    }

    /// Reads `!=` or `!~`. A bare `!` is illegal.
    fn read_not_equals_or_not_matches(&mut self) {
        let start = self.start();
        self.eat();
        let kind = if self.eat_if('=') {
            TokenKind::NotEquals
        } else if self.eat_if('~') {
            TokenKind::NotMatches
        } else {
            TokenKind::Illegal
        };
        self.push(kind, start);
    }

    /// Reads `<`/`<=` or `>`/`>=`.
    fn read_ordering(&mut self, strict: TokenKind, or_equal: TokenKind) {
        let start = self.start();
        self.eat();
        let kind = if self.eat_if('=') { or_equal } else { strict };
        self.push(kind, start);
    }

    /// Reads `&&` or `||`. A single character without its partner is
    /// illegal and the following character is left alone.
    fn read_doubled(&mut self, kind: TokenKind) {
        let start = self.start();
        let Some(c) = self.eat() else {
            return;
        };
        let kind = if self.eat_if(c) {
            kind
        } else {
            TokenKind::Illegal
        };
        self.push(kind, start);
    }

    /// Reads a quoted string up to the matching unescaped quote.
    fn read_string(&mut self) -> ExprResult<()> {
        let (line, column) = self.start();
        let Some(quote) = self.eat() else {
            return Ok(());
        };
        let mut escaped = false;
        loop {
            let Some(c) = self.eat() else {
                return Err(ExprError::UnterminatedString { line, column });
            };
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                break;
            }
        }
        self.push(TokenKind::String, (line, column));
        Ok(())
    }

    /// Reads a single character as a token of the given kind.
    fn read_single(&mut self, kind: TokenKind) {
        let start = self.start();
        self.eat();
        self.push(kind, start);
    }

    /// Tokenizes the whole input, whitespace included.
    ///
    /// The returned sequence always ends with an [`TokenKind::Eof`] token.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::UnterminatedString`] if the input ends inside a
    /// string literal.
    pub fn tokenize(mut self) -> ExprResult<Vec<Token>> {
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => self.read_number(),
                c if c.is_whitespace() => self.read_whitespace(),
                c if is_ident_start(c) => self.read_identifier(),
                '=' => self.read_equals_or_matches(),
                '!' => self.read_not_equals_or_not_matches(),
                '>' => self.read_ordering(TokenKind::Greater, TokenKind::GreaterOrEqual),
                '<' => self.read_ordering(TokenKind::Less, TokenKind::LessOrEqual),
                '"' | '\'' => self.read_string()?,
                '&' => self.read_doubled(TokenKind::And),
                '|' => self.read_doubled(TokenKind::Or),
                '(' => self.read_single(TokenKind::LBrace),
                ')' => self.read_single(TokenKind::RBrace),
                _ => self.read_single(TokenKind::Illegal),
            }
        }
        let end = self.start();
        self.push(TokenKind::Eof, end);
        tracing::trace!(count = self.tokens.len(), "tokenized expression");
        Ok(self.tokens)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().unwrap()
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokens(input).into_iter().map(|t| t.kind).collect()
    }

    fn tok(kind: TokenKind, literal: &str, line: usize, column: usize) -> Token {
        Token::new(kind, literal, line, column)
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert_eq!(tokens(""), vec![tok(TokenKind::Eof, "", 1, 1)]);
    }

    #[test]
    fn test_tokenize_simple_condition() {
        assert_eq!(
            tokens("a < 5"),
            vec![
                tok(TokenKind::Identifier, "a", 1, 1),
                tok(TokenKind::WhiteSpace, " ", 1, 2),
                tok(TokenKind::Less, "<", 1, 3),
                tok(TokenKind::WhiteSpace, " ", 1, 4),
                tok(TokenKind::Number, "5", 1, 5),
                tok(TokenKind::Eof, "", 1, 6),
            ]
        );
    }

    #[test]
    fn test_tokenize_all_operators() {
        assert_eq!(
            kinds("= != =~ !~ < > <= >="),
            vec![
                TokenKind::Equals,
                TokenKind::WhiteSpace,
                TokenKind::NotEquals,
                TokenKind::WhiteSpace,
                TokenKind::Matches,
                TokenKind::WhiteSpace,
                TokenKind::NotMatches,
                TokenKind::WhiteSpace,
                TokenKind::Less,
                TokenKind::WhiteSpace,
                TokenKind::Greater,
                TokenKind::WhiteSpace,
                TokenKind::LessOrEqual,
                TokenKind::WhiteSpace,
                TokenKind::GreaterOrEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_operators_without_spaces() {
        assert_eq!(
            tokens("a>=1"),
            vec![
                tok(TokenKind::Identifier, "a", 1, 1),
                tok(TokenKind::GreaterOrEqual, ">=", 1, 2),
                tok(TokenKind::Number, "1", 1, 4),
                tok(TokenKind::Eof, "", 1, 5),
            ]
        );
    }

    #[test]
    fn test_tokenize_keywords_case_insensitive() {
        let result = tokens("a AND b Or c");
        assert_eq!(result[2], tok(TokenKind::And, "AND", 1, 3));
        assert_eq!(result[6], tok(TokenKind::Or, "Or", 1, 9));
    }

    #[test]
    fn test_tokenize_keyword_prefix_is_identifier() {
        assert_eq!(
            kinds("android order"),
            vec![
                TokenKind::Identifier,
                TokenKind::WhiteSpace,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_symbolic_combine_operators() {
        assert_eq!(
            tokens("&&||"),
            vec![
                tok(TokenKind::And, "&&", 1, 1),
                tok(TokenKind::Or, "||", 1, 3),
                tok(TokenKind::Eof, "", 1, 5),
            ]
        );
    }

    #[test]
    fn test_tokenize_single_ampersand_is_illegal() {
        assert_eq!(
            tokens("&b"),
            vec![
                tok(TokenKind::Illegal, "&", 1, 1),
                tok(TokenKind::Identifier, "b", 1, 2),
                tok(TokenKind::Eof, "", 1, 3),
            ]
        );
        assert_eq!(
            tokens("|"),
            vec![tok(TokenKind::Illegal, "|", 1, 1), tok(TokenKind::Eof, "", 1, 2)]
        );
    }

    #[test]
    fn test_tokenize_mixed_pipe_and_ampersand() {
        assert_eq!(
            tokens("&|"),
            vec![
                tok(TokenKind::Illegal, "&", 1, 1),
                tok(TokenKind::Illegal, "|", 1, 2),
                tok(TokenKind::Eof, "", 1, 3),
            ]
        );
    }

    #[test]
    fn test_tokenize_bang_alone_is_illegal() {
        assert_eq!(
            tokens("!x"),
            vec![
                tok(TokenKind::Illegal, "!", 1, 1),
                tok(TokenKind::Identifier, "x", 1, 2),
                tok(TokenKind::Eof, "", 1, 3),
            ]
        );
    }

    #[test]
    fn test_tokenize_number_with_second_dot() {
        assert_eq!(
            tokens("3.14."),
            vec![
                tok(TokenKind::Number, "3.14", 1, 1),
                tok(TokenKind::Illegal, ".", 1, 5),
                tok(TokenKind::Eof, "", 1, 6),
            ]
        );
    }

    #[test]
    fn test_tokenize_number_trailing_dot() {
        assert_eq!(tokens("7.")[0], tok(TokenKind::Number, "7.", 1, 1));
    }

    #[test]
    fn test_tokenize_identifier_with_digits_and_underscore() {
        assert_eq!(
            tokens("_flight_level2")[0],
            tok(TokenKind::Identifier, "_flight_level2", 1, 1)
        );
    }

    #[test]
    fn test_tokenize_number_then_identifier() {
        assert_eq!(
            kinds("12ab"),
            vec![TokenKind::Number, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_tokenize_strings() {
        assert_eq!(
            tokens(r#"'single' "double""#),
            vec![
                tok(TokenKind::String, "'single'", 1, 1),
                tok(TokenKind::WhiteSpace, " ", 1, 9),
                tok(TokenKind::String, "\"double\"", 1, 10),
                tok(TokenKind::Eof, "", 1, 18),
            ]
        );
    }

    #[test]
    fn test_tokenize_string_with_other_quote_inside() {
        assert_eq!(tokens(r#""it's""#)[0], tok(TokenKind::String, r#""it's""#, 1, 1));
    }

    #[test]
    fn test_tokenize_string_escapes_kept_verbatim() {
        assert_eq!(
            tokens(r#""a\"b" x"#)[0],
            tok(TokenKind::String, r#""a\"b""#, 1, 1)
        );
    }

    #[test]
    fn test_tokenize_string_escaped_backslash_closes() {
        assert_eq!(
            tokens(r#""a\\" x"#),
            vec![
                tok(TokenKind::String, r#""a\\""#, 1, 1),
                tok(TokenKind::WhiteSpace, " ", 1, 6),
                tok(TokenKind::Identifier, "x", 1, 7),
                tok(TokenKind::Eof, "", 1, 8),
            ]
        );
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let err = Lexer::new("name = \"abc").tokenize().unwrap_err();
        assert_eq!(err, ExprError::UnterminatedString { line: 1, column: 8 });
    }

    #[test]
    fn test_tokenize_unterminated_string_after_escaped_quote() {
        let err = Lexer::new(r#"'abc\'"#).tokenize().unwrap_err();
        assert_eq!(err, ExprError::UnterminatedString { line: 1, column: 1 });
    }

    #[test]
    fn test_tokenize_braces() {
        assert_eq!(
            kinds("(a=1)"),
            vec![
                TokenKind::LBrace,
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_unknown_characters_continue() {
        assert_eq!(
            tokens("a # b"),
            vec![
                tok(TokenKind::Identifier, "a", 1, 1),
                tok(TokenKind::WhiteSpace, " ", 1, 2),
                tok(TokenKind::Illegal, "#", 1, 3),
                tok(TokenKind::WhiteSpace, " ", 1, 4),
                tok(TokenKind::Identifier, "b", 1, 5),
                tok(TokenKind::Eof, "", 1, 6),
            ]
        );
    }

    #[test]
    fn test_tokenize_non_ascii_letter_is_illegal() {
        assert_eq!(
            tokens("é"),
            vec![tok(TokenKind::Illegal, "é", 1, 1), tok(TokenKind::Eof, "", 1, 2)]
        );
    }

    #[test]
    fn test_tokenize_unicode_whitespace() {
        assert_eq!(
            kinds("a\u{00A0}b"),
            vec![
                TokenKind::Identifier,
                TokenKind::WhiteSpace,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_tracks_lines() {
        assert_eq!(
            tokens("a\n= 1"),
            vec![
                tok(TokenKind::Identifier, "a", 1, 1),
                tok(TokenKind::WhiteSpace, "\n", 1, 2),
                tok(TokenKind::Equals, "=", 2, 1),
                tok(TokenKind::WhiteSpace, " ", 2, 2),
                tok(TokenKind::Number, "1", 2, 3),
                tok(TokenKind::Eof, "", 2, 4),
            ]
        );
    }

    #[test]
    fn test_tokenize_newline_inside_string() {
        let result = tokens("'a\nb' c");
        assert_eq!(result[0], tok(TokenKind::String, "'a\nb'", 1, 1));
        assert_eq!(result[2], tok(TokenKind::Identifier, "c", 2, 4));
    }

    #[test]
    fn test_tokenize_always_ends_with_eof() {
        for input in ["", "a", "a = 1 and (", "&&&", "\"x\"", "  \n\t", "1.2.3.4", "!!~"] {
            let result = tokens(input);
            let last = result.last().unwrap();
            assert_eq!(last.kind, TokenKind::Eof, "input {input:?}");
            assert!(last.literal.is_empty());
            assert_eq!(
                result.iter().filter(|t| t.kind == TokenKind::Eof).count(),
                1,
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_token_display() {
        let token = tok(TokenKind::WhiteSpace, " \n ", 3, 7);
        assert_eq!(
            token.to_string(),
            r#"<Token type=WhiteSpace literal=" \n " at=3:7>"#
        );
        assert_eq!(
            tok(TokenKind::Eof, "", 1, 6).to_string(),
            r#"<Token type=EOF literal="" at=1:6>"#
        );
    }
}
