//! Token output formatting.

use lee_core::Token;
use serde::Serialize;

use super::helpers::paint_token;

/// JSON output structure for the tokens command.
#[derive(Serialize)]
pub struct TokensOutput<'a> {
    pub tokens: Vec<TokenOutput<'a>>,
}

/// JSON output structure for a single token.
#[derive(Serialize)]
pub struct TokenOutput<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub literal: &'a str,
    pub line: usize,
    pub column: usize,
}

/// Formats tokens as JSON.
pub fn format_tokens_json<'a, I>(tokens: I) -> Result<String, serde_json::Error>
where
    I: IntoIterator<Item = &'a Token>,
{
    let output = TokensOutput {
        tokens: tokens
            .into_iter()
            .map(|t| TokenOutput {
                kind: t.kind.name(),
                literal: &t.literal,
                line: t.line,
                column: t.column,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats tokens one per line in their `<Token ...>` rendering.
pub fn format_tokens_table<'a, I>(tokens: I, use_colors: bool) -> String
where
    I: IntoIterator<Item = &'a Token>,
{
    let mut output = String::new();
    for token in tokens {
        output.push_str(&paint_token(token.kind, &token.to_string(), use_colors));
        output.push('\n');
    }
    output
}
