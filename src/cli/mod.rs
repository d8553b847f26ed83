//! CLI module for complyr - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
