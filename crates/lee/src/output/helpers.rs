//! Common helper functions for output formatting.

use lee_core::TokenKind;
use owo_colors::OwoColorize;

/// Formats a 1-based source position as `line:column`.
pub fn format_position(line: usize, column: usize) -> String {
    format!("{line}:{column}")
}

/// Colors `text` according to the kind of token it belongs to.
pub fn paint_token(kind: TokenKind, text: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match kind {
        TokenKind::Identifier => text.cyan().to_string(),
        TokenKind::String | TokenKind::Number => text.green().to_string(),
        TokenKind::And | TokenKind::Or => text.magenta().bold().to_string(),
        TokenKind::Illegal => text.red().bold().to_string(),
        TokenKind::WhiteSpace | TokenKind::Eof => text.dimmed().to_string(),
        TokenKind::LBrace | TokenKind::RBrace => text.to_string(),
        _ => text.yellow().to_string(),
    }
}

/// Formats a section header.
pub fn format_header(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.green().bold().to_string()
    } else {
        text.to_string()
    }
}
