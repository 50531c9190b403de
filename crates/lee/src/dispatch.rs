//! Command dispatch module for routing CLI commands to their handlers.
//!
//! This module provides trait-based dispatch for CLI commands, keeping the
//! argument plumbing out of main.rs.

use crate::cli::{Cli, Commands, ConfigCommands, FieldSpec, Shell};
use crate::commands::config::Config;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for executable commands.
pub trait RunCommand {
    /// Execute the command with the loaded configuration.
    fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()>;
}

/// A parsed command line, borrowing its arguments from [`Cli`].
#[derive(Debug)]
pub enum Dispatch<'a> {
    Tokens {
        expression: &'a str,
        keep_whitespace: bool,
    },
    Parse {
        expression: &'a str,
    },
    Filter {
        expression: &'a str,
        input: &'a Option<std::path::PathBuf>,
        fields: &'a [FieldSpec],
        ignore_case: bool,
        limit: Option<usize>,
        count: bool,
    },
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> Dispatch<'a> {
    /// Creates a dispatch from the CLI command.
    pub fn from_cli(cli: &'a Cli) -> Self {
        match &cli.command {
            Some(Commands::Tokens {
                expression,
                keep_whitespace,
            }) => Self::Tokens {
                expression,
                keep_whitespace: *keep_whitespace,
            },
            Some(Commands::Parse { expression }) => Self::Parse { expression },
            Some(Commands::Filter {
                expression,
                input,
                fields,
                ignore_case,
                limit,
                count,
            }) => Self::Filter {
                expression,
                input,
                fields,
                ignore_case: *ignore_case,
                limit: *limit,
                count: *count,
            },
            Some(Commands::Config { command }) => Self::Config(command),
            Some(Commands::Completions { shell }) => Self::Completions(shell),
            None => Self::Help,
        }
    }
}

impl RunCommand for Dispatch<'_> {
    fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()> {
        match self {
            Self::Tokens {
                expression,
                keep_whitespace,
            } => {
                let opts = commands::tokens::TokensOptions {
                    expression: (*expression).to_string(),
                    keep_whitespace: *keep_whitespace,
                };
                commands::tokens::execute(ctx, &opts)
            }
            Self::Parse { expression } => commands::parse::execute(ctx, expression),
            Self::Filter {
                expression,
                input,
                fields,
                ignore_case,
                limit,
                count,
            } => {
                let opts = commands::filter::FilterOptions {
                    expression: (*expression).to_string(),
                    input: (*input).clone(),
                    fields: fields.to_vec(),
                    ignore_case: *ignore_case,
                    limit: *limit,
                    count: *count,
                };
                commands::filter::execute(ctx, &opts, config)
            }
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("lee - filter JSON records with boolean expressions");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}
