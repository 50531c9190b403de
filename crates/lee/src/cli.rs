//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the lee CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::records::FieldType;

/// lee - filter JSON records with boolean expressions
#[derive(Parser, Debug)]
#[command(name = "lee")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tokens of an expression
    Tokens {
        /// Filter expression
        expression: String,

        /// Keep whitespace tokens
        #[arg(short = 'w', long)]
        keep_whitespace: bool,
    },

    /// Parse an expression and show its structure
    Parse {
        /// Filter expression
        expression: String,
    },

    /// Filter JSON records read from a file or stdin
    #[command(alias = "f")]
    Filter {
        /// Filter expression (e.g., "altitude > 3000 and callsign =~ '^DLH'")
        expression: String,

        /// Input file with a JSON array or JSON lines (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Declare a field type, NAME:TYPE with TYPE string or number (repeatable)
        #[arg(long = "field", value_name = "NAME:TYPE", value_parser = parse_field_spec, action = clap::ArgAction::Append)]
        fields: Vec<FieldSpec>,

        /// Case-insensitive regular expression matching
        #[arg(short = 'I', long)]
        ignore_case: bool,

        /// Stop after N matching records
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the number of matching records instead of the records
        #[arg(short, long)]
        count: bool,
    },

    /// View and edit configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// A field declared on the command line with `--field NAME:TYPE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
}

fn parse_field_spec(s: &str) -> Result<FieldSpec, String> {
    let (name, field_type) = s
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:TYPE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{s}'"));
    }
    Ok(FieldSpec {
        name: name.to_string(),
        field_type: field_type.trim().parse()?,
    })
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., output.color, fields.altitude)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}
