//! Output formatting utilities for the lee CLI.
//!
//! This module provides functions for formatting data as text or JSON.
//! It is organized into submodules by what is being shown:
//!
//! - [`tokens`] - Token dumps (tokens command)
//! - [`expression`] - Parsed expression trees and conditions (parse command)
//! - [`records`] - Matched records and counts (filter command)
//! - [`helpers`] - Common formatting utilities (token coloring, positions)

mod expression;
pub mod helpers;
mod records;
mod tokens;

// Tokens
pub use tokens::{format_tokens_json, format_tokens_table};

// Expressions
pub use expression::{format_expression_json, format_expression_table};

// Records
pub use records::{format_count, format_count_json, format_records, format_records_json};
